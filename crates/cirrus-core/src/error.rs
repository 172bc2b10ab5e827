use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("image reference cannot be generated, as {0} field is missing")]
    MissingImageField(&'static str),
}
