//! Rich value parts under `xl/richData/`.
//!
//! - [`rich_value`]: `rdrichvalue.xml` (`<rvData>`), the rich value instances themselves.
//! - [`rich_value_rel`]: `richValueRel.xml` (`<richValueRels>`), the relationship-id table that
//!   rich value payloads index into instead of embedding `rId*` strings.

pub mod rich_value;
pub mod rich_value_rel;

pub use rich_value::{
    parse_rich_value_data_xml, write_rich_value_data_xml, write_rich_value_data_xml_with_options,
    RichValue, RichValueData, RICHDATA_NS,
};
pub use rich_value_rel::{
    parse_rich_value_rels_xml, write_rich_value_rels_xml, RichValueRel, RichValueRels,
    RELATIONSHIPS_NS, RICH_VALUE_REL_NS,
};
