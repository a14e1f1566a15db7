//! Query parameters and signed URL assembly.

use url::form_urlencoded;

use crate::checksum::{ChecksumAlgorithm, sign};

/// Ordered query parameters; entries without a value are never sent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    entries: Vec<(String, Option<String>)>,
}

impl QueryParams {
    /// Empty parameter set.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Append a parameter with a value.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.entries.push((key.into(), Some(value.into())));
        self
    }

    /// Append a parameter whose value may be absent.
    #[must_use]
    pub fn with_opt(mut self, key: impl Into<String>, value: Option<impl Into<String>>) -> Self {
        self.entries.push((key.into(), value.map(Into::into)));
        self
    }

    /// Iterate over the parameters that carry a value, in insertion order.
    pub fn present(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .filter_map(|(key, value)| value.as_deref().map(|value| (key.as_str(), value)))
    }
}

/// URL-encode the present parameters in insertion order, joined with `&`.
#[must_use]
pub fn encode_query(params: &QueryParams) -> String {
    let mut serializer = form_urlencoded::Serializer::new(String::new());
    for (key, value) in params.present() {
        serializer.append_pair(key, value);
    }
    serializer.finish()
}

/// Build `<endpoint>/<command>?<query>&checksum=<digest>`.
///
/// The checksum covers the encoded query exactly as emitted, so callers can
/// compare the result by string.
#[must_use]
pub fn build_url(
    endpoint: &str,
    command: &str,
    params: &QueryParams,
    secret: &str,
    algorithm: ChecksumAlgorithm,
) -> String {
    let mut query = encode_query(params);
    let checksum = sign(algorithm, command, &query, secret);
    if !query.is_empty() {
        query.push('&');
    }
    query.push_str("checksum=");
    query.push_str(&checksum);
    format!("{endpoint}/{command}?{query}")
}

#[cfg(test)]
mod tests {
    use super::*;

    const ENDPOINT: &str = "https://bbb.example.org/bigbluebutton/api";

    #[test]
    fn absent_values_are_dropped_and_spaces_encoded() {
        let params = QueryParams::new()
            .with("a", "1")
            .with_opt("b", None::<String>)
            .with("c", "x y");
        let url = build_url(ENDPOINT, "test", &params, "secret", ChecksumAlgorithm::Sha1);

        assert!(url.contains("a=1"));
        assert!(!url.contains("b="));
        assert!(url.contains("c=x+y"));

        let expected = sign(ChecksumAlgorithm::Sha1, "test", "a=1&c=x+y", "secret");
        assert_eq!(expected, "4df49584c01e0aaad9b9e512f0b8a48e1a4d402f");
        assert!(url.ends_with(&format!("&checksum={expected}")));
        assert_eq!(
            url,
            format!("{ENDPOINT}/test?a=1&c=x+y&checksum={expected}")
        );
    }

    #[test]
    fn empty_query_has_no_leading_ampersand() {
        let url = build_url(
            ENDPOINT,
            "getMeetings",
            &QueryParams::new(),
            "secret",
            ChecksumAlgorithm::Sha1,
        );
        assert_eq!(
            url,
            format!("{ENDPOINT}/getMeetings?checksum=867e6596b930651c0cd4dd1912bec902fae56d5a")
        );
    }

    #[test]
    fn insertion_order_is_preserved() {
        let params = QueryParams::new()
            .with("zeta", "1")
            .with("alpha", "2")
            .with("mid", "3");
        assert_eq!(encode_query(&params), "zeta=1&alpha=2&mid=3");
    }

    #[test]
    fn only_absent_values_encode_to_nothing() {
        let params = QueryParams::new().with_opt("meetingID", None::<&str>);
        assert_eq!(params.present().count(), 0);
        assert_eq!(encode_query(&params), "");
    }

    #[test]
    fn reserved_characters_are_percent_encoded() {
        let params = QueryParams::new().with("name", "a&b=c/d");
        assert_eq!(encode_query(&params), "name=a%26b%3Dc%2Fd");
    }
}
