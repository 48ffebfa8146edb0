//! Header production.
//!
//! Merges caller-supplied headers with the negotiated content type and
//! length. Header names are plain lower-cased strings, matching what
//! the encoders put on the wire.

use std::collections::HashMap;

use crate::{FormData, Result};

impl FormData {
    /// Produce the header set for this body, merged with optional
    /// caller-supplied headers.
    ///
    /// Caller-supplied names are trimmed and lower-cased. `content-type`
    /// is always present: the negotiated type, with any caller-supplied
    /// `content-type` appended after `"; "`. When the body length is
    /// computable the result carries `content-length`; otherwise it
    /// carries `connection: close` and `transfer-encoding: chunked`,
    /// and any caller-supplied `content-length` is dropped.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Stat`] if a file field's size lookup
    /// fails during length computation.
    pub fn headers(
        &self,
        extra: Option<&HashMap<String, String>>,
    ) -> Result<HashMap<String, String>> {
        let mut merged = HashMap::new();
        if let Some(extra) = extra {
            for (name, value) in extra {
                merged.insert(name.trim().to_lowercase(), value.clone());
            }
        }

        let mut content_type = self.content_type();
        if let Some(suffix) = merged.get("content-type") {
            content_type = format!("{content_type}; {suffix}");
        }
        merged.insert("content-type".to_string(), content_type);

        match self.content_length()? {
            Some(length) => {
                merged.insert("content-length".to_string(), length.to_string());
            }
            None => {
                merged.remove("content-length");
                merged.insert("connection".to_string(), "close".to_string());
                merged.insert("transfer-encoding".to_string(), "chunked".to_string());
            }
        }

        Ok(merged)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use crate::FormData;

    #[test]
    fn scalar_body_gets_content_length() {
        let mut form = FormData::new();
        form.set("name", "Bob");
        form.set("age", 30);

        let headers = form.headers(None).expect("headers");
        assert_eq!(
            headers.get("content-type").map(String::as_str),
            Some("application/x-www-form-urlencoded")
        );
        assert_eq!(headers.get("content-length").map(String::as_str), Some("15"));
        assert!(!headers.contains_key("transfer-encoding"));
    }

    #[test]
    fn caller_headers_are_lowercased_and_kept() {
        let mut form = FormData::new();
        form.set("a", 1);

        let mut extra = HashMap::new();
        extra.insert("  X-Custom ".to_string(), "yes".to_string());
        let headers = form.headers(Some(&extra)).expect("headers");
        assert_eq!(headers.get("x-custom").map(String::as_str), Some("yes"));
    }

    #[test]
    fn caller_content_type_becomes_suffix() {
        let mut form = FormData::new();
        form.set("a", 1);

        let mut extra = HashMap::new();
        extra.insert("Content-Type".to_string(), "charset=utf-8".to_string());
        let headers = form.headers(Some(&extra)).expect("headers");
        assert_eq!(
            headers.get("content-type").map(String::as_str),
            Some("application/x-www-form-urlencoded; charset=utf-8")
        );
    }

    #[test]
    fn uncountable_body_falls_back_to_chunked() {
        let source: crate::BodyStream = Box::pin(futures_util::stream::empty());
        let mut form = FormData::new();
        form.set_stream("raw", source);

        let mut extra = HashMap::new();
        extra.insert("Content-Length".to_string(), "999".to_string());
        let headers = form.headers(Some(&extra)).expect("headers");

        assert!(!headers.contains_key("content-length"));
        assert_eq!(headers.get("connection").map(String::as_str), Some("close"));
        assert_eq!(
            headers.get("transfer-encoding").map(String::as_str),
            Some("chunked")
        );
    }
}
