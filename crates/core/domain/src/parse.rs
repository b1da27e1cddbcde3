//! 原始配置文本解析：先按 YAML，失败再按 JSON。

use crate::document::{ConfigDocument, DocumentError};

/// 原始文本的实际格式。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    Yaml,
    Json,
}

impl SourceFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Yaml => "yaml",
            Self::Json => "json",
        }
    }
}

/// 只做格式识别与反序列化，不补全、不校验。
pub fn parse_raw(raw: &str) -> Result<(ConfigDocument, SourceFormat), DocumentError> {
    let yaml_err = match serde_yaml::from_str::<ConfigDocument>(raw) {
        Ok(document) => return Ok((document, SourceFormat::Yaml)),
        Err(err) => err,
    };
    match serde_json::from_str::<ConfigDocument>(raw) {
        Ok(document) => Ok((document, SourceFormat::Json)),
        Err(json_err) => Err(DocumentError::InvalidFormat {
            yaml: yaml_err.to_string(),
            json: json_err.to_string(),
        }),
    }
}

/// 解析 + 边界补全 + 结构校验，得到可以直接部署的文档。
pub fn parse_document(raw: &str) -> Result<(ConfigDocument, SourceFormat), DocumentError> {
    let (mut document, format) = parse_raw(raw)?;
    document.normalize();
    document.validate()?;
    Ok((document, format))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_mapping_is_empty_document() {
        let (document, format) = parse_raw("{}").expect("parse");
        assert_eq!(format, SourceFormat::Yaml);
        assert!(document.io_setup.ports.is_empty());
        assert!(document.destinations.is_empty());
    }

    #[test]
    fn scalar_document_is_rejected() {
        let err = parse_raw("just a sentence").expect_err("scalar");
        assert!(matches!(err, DocumentError::InvalidFormat { .. }));
    }
}
