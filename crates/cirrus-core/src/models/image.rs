use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Abstract image descriptor declared on a machine.
///
/// Three addressing modes share this struct: an opaque `id`, a Shared Image
/// Gallery coordinate set, or a Marketplace reference. `version` is shared
/// by the gallery and marketplace modes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Image {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    // ── Shared Image Gallery ──
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subscription_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_group: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gallery: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    // ── Marketplace ──
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub publisher: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sku: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

/// The concrete addressing scheme an [`Image`] resolved to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedImage {
    Id(String),
    SharedGallery(String),
    Marketplace {
        publisher: String,
        offer: String,
        sku: String,
        version: String,
    },
}

impl Image {
    /// Resolve into exactly one addressing scheme.
    ///
    /// Precedence is strict: explicit id, then a complete gallery coordinate
    /// set, then marketplace. Only the marketplace step can fail, since it is
    /// the last fallback.
    pub fn resolve(&self) -> Result<ResolvedImage, CoreError> {
        if let Some(id) = &self.id {
            return Ok(ResolvedImage::Id(id.clone()));
        }

        if let Some(path) = self.shared_gallery_id() {
            return Ok(ResolvedImage::SharedGallery(path));
        }

        self.marketplace()
    }

    /// Resource id of a Shared Image Gallery image version, if all five
    /// coordinates are present.
    pub fn shared_gallery_id(&self) -> Option<String> {
        let subscription = self.subscription_id.as_deref()?;
        let resource_group = self.resource_group.as_deref()?;
        let gallery = self.gallery.as_deref()?;
        let name = self.name.as_deref()?;
        let version = self.version.as_deref()?;

        Some(format!(
            "/subscriptions/{subscription}/resourceGroups/{resource_group}/providers/Microsoft.Compute/galleries/{gallery}/images/{name}/versions/{version}"
        ))
    }

    fn marketplace(&self) -> Result<ResolvedImage, CoreError> {
        let field = |value: &Option<String>, name: &'static str| {
            value.clone().ok_or(CoreError::MissingImageField(name))
        };

        Ok(ResolvedImage::Marketplace {
            publisher: field(&self.publisher, "Publisher")?,
            offer: field(&self.offer, "Offer")?,
            sku: field(&self.sku, "SKU")?,
            version: field(&self.version, "Version")?,
        })
    }
}

/// `storageProfile.imageReference` in a virtual machine document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageReference {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub publisher: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sku: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

impl From<ResolvedImage> for ImageReference {
    fn from(image: ResolvedImage) -> Self {
        match image {
            ResolvedImage::Id(id) | ResolvedImage::SharedGallery(id) => ImageReference {
                id: Some(id),
                ..Default::default()
            },
            ResolvedImage::Marketplace {
                publisher,
                offer,
                sku,
                version,
            } => ImageReference {
                id: None,
                publisher: Some(publisher),
                offer: Some(offer),
                sku: Some(sku),
                version: Some(version),
            },
        }
    }
}
