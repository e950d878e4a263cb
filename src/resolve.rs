//! Image reference resolution.
//!
//! Catalog photos carry an opaque `image_ref`; turning it into a URL belongs
//! to the CDN/resizing collaborator. Components only depend on the
//! [`ImageResolver`] trait so the host can plug in its own URL scheme.

/// Turns an opaque image reference into a URL for a given display width.
pub trait ImageResolver {
    fn resolve(&self, image_ref: &str, width: u32) -> String;
}

/// Resolver that fills in a URL template.
///
/// `{ref}` is replaced by the image reference (leading slashes stripped) and
/// `{width}` by the requested width:
///
/// ```
/// # use gallery_sync::resolve::{ImageResolver, UrlTemplateResolver};
/// let r = UrlTemplateResolver::new("/images/{ref}?w={width}");
/// assert_eq!(r.resolve("street/dusk.jpg", 800), "/images/street/dusk.jpg?w=800");
/// ```
#[derive(Debug, Clone)]
pub struct UrlTemplateResolver {
    template: String,
}

impl UrlTemplateResolver {
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
        }
    }
}

impl ImageResolver for UrlTemplateResolver {
    fn resolve(&self, image_ref: &str, width: u32) -> String {
        self.template
            .replace("{ref}", image_ref.trim_start_matches('/'))
            .replace("{width}", &width.to_string())
    }
}
