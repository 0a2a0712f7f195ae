//! OGC XML documents used across the workspace's tests.
//!
//! Each function returns a complete document the way a GeoServer instance
//! would send it, parameterized only where tests need to vary it.

/// A WCS 1.0.0 DescribeCoverage response for one coverage.
///
/// The grid envelope is written as `0 0 width-1 height-1`, so the described
/// grid has exactly `width` by `height` cells over `bbox`.
pub fn describe_coverage_xml(
    name: &str,
    width: u32,
    height: u32,
    crs: &str,
    bbox: [f64; 4],
) -> String {
    let [min_x, min_y, max_x, max_y] = bbox;
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<wcs:CoverageDescription xmlns:wcs="http://www.opengis.net/wcs" xmlns:gml="http://www.opengis.net/gml" version="1.0.0">
  <wcs:CoverageOffering>
    <wcs:name>{name}</wcs:name>
    <wcs:label>{name}</wcs:label>
    <wcs:lonLatEnvelope srsName="urn:ogc:def:crs:OGC:1.3:CRS84">
      <gml:pos>3.2 50.7</gml:pos>
      <gml:pos>7.2 53.6</gml:pos>
    </wcs:lonLatEnvelope>
    <wcs:domainSet>
      <wcs:spatialDomain>
        <gml:Envelope srsName="{crs}">
          <gml:pos>{min_x} {min_y}</gml:pos>
          <gml:pos>{max_x} {max_y}</gml:pos>
        </gml:Envelope>
        <gml:RectifiedGrid dimension="2" srsName="{crs}">
          <gml:limits>
            <gml:GridEnvelope>
              <gml:low>0 0</gml:low>
              <gml:high>{high_x} {high_y}</gml:high>
            </gml:GridEnvelope>
          </gml:limits>
          <gml:axisName>x</gml:axisName>
          <gml:axisName>y</gml:axisName>
        </gml:RectifiedGrid>
      </wcs:spatialDomain>
    </wcs:domainSet>
    <wcs:supportedCRSs>
      <wcs:requestResponseCRSs>{crs}</wcs:requestResponseCRSs>
      <wcs:nativeCRSs>{crs}</wcs:nativeCRSs>
    </wcs:supportedCRSs>
    <wcs:supportedFormats nativeFormat="GeoTIFF">
      <wcs:formats>GeoTIFF</wcs:formats>
    </wcs:supportedFormats>
  </wcs:CoverageOffering>
</wcs:CoverageDescription>"#,
        high_x = width - 1,
        high_y = height - 1,
    )
}

/// A WMS 1.3.0 capabilities document.
///
/// Layer tree:
/// - unnamed root group with an EPSG:4326 bbox
///   - `topp:states` (queryable, own EPSG:3857 bbox)
///   - `nurc:mosaic` (not queryable, inherits the root bbox)
///   - group `base` (named, not queryable)
///     - `base:roads` (queryable, inherits the root bbox)
pub fn wms_capabilities_xml() -> String {
    r#"<?xml version="1.0" encoding="UTF-8"?>
<WMS_Capabilities version="1.3.0" xmlns="http://www.opengis.net/wms" xmlns:xlink="http://www.w3.org/1999/xlink">
  <Service>
    <Name>WMS</Name>
    <Title>Stub Web Map Service</Title>
  </Service>
  <Capability>
    <Request>
      <GetMap><Format>image/jpeg</Format><Format>image/png</Format></GetMap>
      <GetFeatureInfo><Format>text/html</Format></GetFeatureInfo>
    </Request>
    <Layer>
      <Title>Stub root</Title>
      <CRS>EPSG:4326</CRS>
      <BoundingBox CRS="EPSG:4326" minx="-10.0" miny="40.0" maxx="10.0" maxy="60.0"/>
      <Layer queryable="1">
        <Name>topp:states</Name>
        <Title>USA Population</Title>
        <BoundingBox CRS="EPSG:3857" minx="-1000" miny="-2000" maxx="1000" maxy="2000"/>
      </Layer>
      <Layer queryable="0">
        <Name>nurc:mosaic</Name>
        <Title>Mosaic &amp; friends</Title>
      </Layer>
      <Layer>
        <Name>base</Name>
        <Title>Base layers</Title>
        <Layer queryable="1">
          <Name>base:roads</Name>
          <Title>Roads</Title>
        </Layer>
      </Layer>
    </Layer>
  </Capability>
</WMS_Capabilities>"#
        .to_string()
}

/// A WMS `ServiceExceptionReport` with a single exception.
pub fn service_exception_xml(code: &str, message: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<ServiceExceptionReport version="1.3.0" xmlns="http://www.opengis.net/ogc">
  <ServiceException code="{code}">
    {message}
  </ServiceException>
</ServiceExceptionReport>"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_describe_coverage_high_is_inclusive() {
        let xml = describe_coverage_xml("dem", 100, 50, "EPSG:28992", [0.0, 0.0, 100.0, 50.0]);
        assert!(xml.contains("<gml:high>99 49</gml:high>"));
        assert!(xml.contains("<wcs:name>dem</wcs:name>"));
    }

    #[test]
    fn test_service_exception_carries_code() {
        let xml = service_exception_xml("LayerNotDefined", "no such layer");
        assert!(xml.contains(r#"code="LayerNotDefined""#));
    }
}
