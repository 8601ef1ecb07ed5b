use url::Url;

pub const DEFAULT_SERVICE: &str = "https://www.google.com/s2/favicons?domain={host}&sz={size}";

/// Builds icon urls from a template with `{host}` and `{size}` placeholders.
#[derive(Debug, Clone)]
pub struct FaviconSource {
    template: String,
    size: u32,
}

impl Default for FaviconSource {
    fn default() -> Self {
        Self::new(DEFAULT_SERVICE, 16)
    }
}

impl FaviconSource {
    pub fn new(template: &str, size: u32) -> Self {
        Self {
            template: template.to_string(),
            size,
        }
    }

    /// Urls without a host (`file:`, `javascript:`) get an empty reference.
    pub fn derive(&self, url: &str) -> Result<String, url::ParseError> {
        let parsed = Url::parse(url)?;
        Ok(match parsed.host_str() {
            Some(host) => self
                .template
                .replace("{host}", host)
                .replace("{size}", &self.size.to_string()),
            None => String::new(),
        })
    }
}
