//! 基于字符串匹配的简单内容协商。
//!
//! 只实现宿主需要的最小集合：解析 `Accept`、按 `Content-Type` 挑选读取器、按 `Accept`
//! 挑选写入器。不做参数级匹配，也不做格式化器之间的打分。

use crate::{FormatterCapabilities, MediaType, TypeDescriptor};

/// 协商成功的写入器及其选定的媒体类型。
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Negotiated {
    /// 写入器在候选切片中的下标。
    pub index: usize,
    /// 写入响应时使用的 `Content-Type`（不含 q 值）。
    pub media_type: MediaType,
}

/// 解析 `Accept` 头，按 q 值降序稳定排序并丢弃 `q=0` 与无法解析的条目。
pub fn parse_accept(header: &str) -> Vec<MediaType> {
    let mut entries: Vec<MediaType> = header
        .split(',')
        .filter_map(MediaType::parse)
        .filter(|media| media.effective_quality() > crate::Quality::ZERO)
        .collect();
    entries.sort_by(|a, b| b.effective_quality().cmp(&a.effective_quality()));
    entries
}

/// 格式化器是否声明支持 `content_type`（参数被忽略）。
pub fn supports_content_type(formatter: &dyn FormatterCapabilities, content_type: &str) -> bool {
    let Some(candidate) = MediaType::parse(content_type) else {
        return false;
    };
    formatter
        .supported_media_types()
        .iter()
        .any(|supported| supported.matches(&candidate))
}

/// 为请求体挑选读取器，返回首个同时支持内容类型与目标类型的下标。
///
/// 缺少 `Content-Type` 时无法协商，返回 `None`。
pub fn select_reader(
    formatters: &[&dyn FormatterCapabilities],
    ty: &TypeDescriptor,
    content_type: Option<&str>,
) -> Option<usize> {
    let content_type = content_type?;
    formatters.iter().position(|formatter| {
        supports_content_type(*formatter, content_type) && formatter.can_read_type(ty)
    })
}

/// 为响应挑选写入器。
///
/// `Accept` 缺失或为空时选择首个可写的格式化器及其规范类型；否则按客户端偏好顺序，
/// 对每个可接受的范围依次尝试各格式化器的支持列表。
pub fn select_writer(
    formatters: &[&dyn FormatterCapabilities],
    ty: &TypeDescriptor,
    accept: Option<&str>,
) -> Option<Negotiated> {
    let accepted = accept.map(parse_accept).unwrap_or_default();
    let accept_missing = accept.is_none_or(|raw| raw.trim().is_empty());

    if accept_missing {
        return formatters
            .iter()
            .enumerate()
            .filter(|(_, formatter)| formatter.can_write_type(ty))
            .find_map(|(index, formatter)| {
                formatter
                    .supported_media_types()
                    .first()
                    .map(|media_type| Negotiated {
                        index,
                        media_type: media_type.clone(),
                    })
            });
    }

    accepted.iter().find_map(|range| {
        formatters
            .iter()
            .enumerate()
            .filter(|(_, formatter)| formatter.can_write_type(ty))
            .find_map(|(index, formatter)| {
                formatter
                    .supported_media_types()
                    .iter()
                    .find(|supported| range.matches(supported))
                    .map(|media_type| Negotiated {
                        index,
                        media_type: MediaType::new(media_type.essence().to_owned()),
                    })
            })
    })
}
