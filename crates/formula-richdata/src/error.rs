use thiserror::Error;

/// Errors produced while reading or writing metadata / rich-value parts.
#[derive(Debug, Error)]
pub enum RichDataError {
    #[error("xml parse error: {0}")]
    Xml(#[from] quick_xml::Error),
    #[error("xml attribute error: {0}")]
    XmlAttr(#[from] quick_xml::events::attributes::AttrError),
    #[error("utf-8 error: {0}")]
    Utf8(#[from] std::str::Utf8Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed part: {0}")]
    Malformed(String),
    #[error("unexpected root element <{found}> (expected {expected})")]
    UnexpectedRoot {
        expected: &'static str,
        found: String,
    },
    #[error("<{element}> is missing required attribute `{attribute}`")]
    MissingRequiredAttribute {
        element: &'static str,
        attribute: &'static str,
    },
    #[error("<{element}> attribute `{attribute}` is not a valid integer: {value:?}")]
    InvalidIntegerAttribute {
        element: &'static str,
        attribute: &'static str,
        value: String,
    },
}

impl RichDataError {
    /// Whether the error means the markup itself could not be read (as opposed to a
    /// well-formed document missing or mangling a required value).
    pub fn is_malformed_input(&self) -> bool {
        matches!(
            self,
            Self::Xml(_)
                | Self::XmlAttr(_)
                | Self::Utf8(_)
                | Self::Malformed(_)
                | Self::UnexpectedRoot { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_malformed_input() {
        assert!(RichDataError::Malformed("eof".into()).is_malformed_input());
        assert!(RichDataError::UnexpectedRoot {
            expected: "<metadata>",
            found: "worksheet".into()
        }
        .is_malformed_input());
        assert!(!RichDataError::MissingRequiredAttribute {
            element: "rc",
            attribute: "t"
        }
        .is_malformed_input());
    }

    #[test]
    fn messages_name_the_offending_value() {
        let err = RichDataError::InvalidIntegerAttribute {
            element: "rv",
            attribute: "s",
            value: "x1".into(),
        };
        assert_eq!(
            err.to_string(),
            r#"<rv> attribute `s` is not a valid integer: "x1""#
        );
    }
}
