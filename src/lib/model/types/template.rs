//! Module implementing the `Template` type.

use std::fmt;


/// A meme template: base image with some metadata, as listed by the upstream API.
///
/// Templates are immutable once fetched.
#[derive(Clone, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub struct Template {
    pub id: String,
    pub name: String,
    /// URL of the template image.
    #[serde(rename = "url")]
    pub source_url: String,
    pub width: u32,
    pub height: u32,
    /// Suggested number of text captions for the template.
    #[serde(rename = "box_count")]
    pub text_slot_count: u32,
}

impl fmt::Debug for Template {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        write!(fmt, "Template({:?} {:?}, {}x{})",
            self.id, self.name, self.width, self.height)
    }
}

impl fmt::Display for Template {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        write!(fmt, "{} (#{})", self.name, self.id)
    }
}


#[cfg(test)]
mod tests {
    use serde_json::{self, json};
    use spectral::prelude::*;
    use super::Template;

    #[test]
    fn deserialize_upstream_entry() {
        let entry = json!({
            "id": "181913649",
            "name": "Drake Hotline Bling",
            "url": "https://i.imgflip.com/30b1gx.jpg",
            "width": 1200,
            "height": 1200,
            "box_count": 2,
            "captions": 1234,
        });
        let template: Template = serde_json::from_value(entry).unwrap();
        assert_that!(template.id.as_str()).is_equal_to("181913649");
        assert_that!(template.source_url.as_str()).is_equal_to("https://i.imgflip.com/30b1gx.jpg");
        assert_that!(template.width).is_equal_to(1200);
        assert_that!(template.text_slot_count).is_equal_to(2);
    }

    #[test]
    fn serialize_with_upstream_names() {
        let template = Template{
            id: "1".into(), name: "Foo".into(), source_url: "http://x/y.png".into(),
            width: 10, height: 20, text_slot_count: 3,
        };
        let value = serde_json::to_value(&template).unwrap();
        assert_that!(value).is_equal_to(json!({
            "id": "1", "name": "Foo", "url": "http://x/y.png",
            "width": 10, "height": 20, "box_count": 3,
        }));
    }
}
