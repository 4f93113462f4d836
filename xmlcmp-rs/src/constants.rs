//! Constants used throughout xmlcmp.

/// Separator between steps of a node path (`/root/item`).
pub const PATH_SEPARATOR: char = '/';

/// Prefix marking an attribute step in a path (`/root/@id`).
pub const ATTRIBUTE_PATH_PREFIX: char = '@';

/// Namespace URI bound to the `xsi` prefix.
pub const XSI_NAMESPACE: &str = "http://www.w3.org/2001/XMLSchema-instance";

/// Local name of the `xsi:schemaLocation` attribute.
pub const SCHEMA_LOCATION_ATTR: &str = "schemaLocation";

/// Local name of the `xsi:noNamespaceSchemaLocation` attribute.
pub const NO_NAMESPACE_SCHEMA_LOCATION_ATTR: &str = "noNamespaceSchemaLocation";

/// Rule line framing the rendered difference report.
pub const REPORT_RULE: &str = "=======================================================";

/// Key under which mixed text content is stored when converting to JSON.
pub const JSON_TEXT_KEY: &str = "";
