use cirrus_core::CoreError;
use cirrus_core::models::{Image, ImageReference, ResolvedImage};

fn marketplace() -> Image {
    Image {
        publisher: Some("cncf-upstream".into()),
        offer: Some("capi".into()),
        sku: Some("k8s-1dot30dot1-ubuntu-2204".into()),
        version: Some("latest".into()),
        ..Default::default()
    }
}

fn gallery() -> Image {
    Image {
        subscription_id: Some("sub-1".into()),
        resource_group: Some("images-rg".into()),
        gallery: Some("capi_gallery".into()),
        name: Some("ubuntu-2204".into()),
        version: Some("1.2.3".into()),
        ..Default::default()
    }
}

#[test]
fn explicit_id_wins_over_marketplace() {
    let image = Image {
        id: Some("/subscriptions/x/images/custom".into()),
        ..marketplace()
    };

    assert_eq!(
        image.resolve().unwrap(),
        ResolvedImage::Id("/subscriptions/x/images/custom".into())
    );
}

#[test]
fn explicit_id_wins_over_gallery() {
    let image = Image {
        id: Some("custom-id".into()),
        ..gallery()
    };

    assert_eq!(image.resolve().unwrap(), ResolvedImage::Id("custom-id".into()));
}

#[test]
fn complete_gallery_coordinates_build_resource_path() {
    assert_eq!(
        gallery().resolve().unwrap(),
        ResolvedImage::SharedGallery(
            "/subscriptions/sub-1/resourceGroups/images-rg/providers/Microsoft.Compute/galleries/capi_gallery/images/ubuntu-2204/versions/1.2.3"
                .into()
        )
    );
}

#[test]
fn gallery_wins_over_marketplace_when_both_complete() {
    let image = Image {
        publisher: Some("p".into()),
        offer: Some("o".into()),
        sku: Some("s".into()),
        ..gallery()
    };

    assert!(matches!(
        image.resolve().unwrap(),
        ResolvedImage::SharedGallery(_)
    ));
}

#[test]
fn incomplete_gallery_falls_back_to_marketplace() {
    let image = Image {
        subscription_id: Some("sub-1".into()),
        gallery: Some("capi_gallery".into()),
        ..marketplace()
    };

    assert_eq!(
        image.resolve().unwrap(),
        ResolvedImage::Marketplace {
            publisher: "cncf-upstream".into(),
            offer: "capi".into(),
            sku: "k8s-1dot30dot1-ubuntu-2204".into(),
            version: "latest".into(),
        }
    );
}

#[test]
fn marketplace_missing_field_is_named() {
    let cases: [(fn(&mut Image), &str); 4] = [
        (|i| i.publisher = None, "Publisher"),
        (|i| i.offer = None, "Offer"),
        (|i| i.sku = None, "SKU"),
        (|i| i.version = None, "Version"),
    ];

    for (strip, field) in cases {
        let mut image = marketplace();
        strip(&mut image);

        let err = image.resolve().unwrap_err();
        assert!(matches!(err, CoreError::MissingImageField(f) if f == field));
        assert!(err.to_string().contains(field), "{err}");
    }
}

#[test]
fn resolved_image_converts_to_reference() {
    let reference = ImageReference::from(gallery().resolve().unwrap());
    assert!(reference.id.is_some());
    assert!(reference.publisher.is_none());

    let reference = ImageReference::from(marketplace().resolve().unwrap());
    assert!(reference.id.is_none());
    assert_eq!(reference.sku.as_deref(), Some("k8s-1dot30dot1-ubuntu-2204"));
}
