//! XML request bodies for the REST API.

use quick_xml::escape::escape;

/// `<coverageStore>` body registering `url` as an ImageMosaic store.
pub fn coverage_store_xml(name: &str, workspace: &str, url: &str) -> String {
    format!(
        "<coverageStore>\
<name>{}</name>\
<workspace>{}</workspace>\
<type>ImageMosaic</type>\
<url>{}</url>\
<enabled>true</enabled>\
<connectionParameters><entry key=\"type\">ImageMosaic</entry></connectionParameters>\
</coverageStore>",
        escape(name),
        escape(workspace),
        escape(url)
    )
}

/// `<layer>` body setting the default style.
pub fn default_style_xml(style: &str) -> String {
    format!(
        "<layer><defaultStyle><name>{}</name></defaultStyle></layer>",
        escape(style)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coverage_store_xml() {
        let xml = coverage_store_xml("rp100", "hazards", "/data/rp100");
        assert!(xml.starts_with("<coverageStore><name>rp100</name><workspace>hazards</workspace>"));
        assert!(xml.contains("<type>ImageMosaic</type>"));
        assert!(xml.contains("<url>/data/rp100</url>"));
        assert!(xml.contains("<enabled>true</enabled>"));
        assert!(xml.contains(r#"<entry key="type">ImageMosaic</entry>"#));
    }

    #[test]
    fn test_text_is_escaped() {
        let xml = coverage_store_xml("a&b", "ws", "/data/<x>");
        assert!(xml.contains("<name>a&amp;b</name>"));
        assert!(xml.contains("<url>/data/&lt;x&gt;</url>"));
    }

    #[test]
    fn test_default_style_xml() {
        assert_eq!(
            default_style_xml("flood_depth"),
            "<layer><defaultStyle><name>flood_depth</name></defaultStyle></layer>"
        );
    }
}
