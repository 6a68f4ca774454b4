//! Cookie读取工具
//! 解析 `Cookie` 请求头（或 document.cookie）格式的字符串

use std::collections::HashMap;

use crate::log::trace;

/// Cookie读取工具
pub struct CookieReader;

impl CookieReader {
    /// 拆分为 (名称, 值) 列表，保留原始顺序，格式错误的片段直接跳过
    pub fn pairs(header: &str) -> Vec<(String, String)> {
        header
            .split(';')
            .filter_map(|segment| {
                let segment = segment.trim();
                if segment.is_empty() {
                    return None;
                }
                let Some((name, value)) = segment.split_once('=') else {
                    trace!("跳过格式错误的Cookie片段：{}", segment);
                    return None;
                };
                let name = name.trim();
                if name.is_empty() {
                    return None;
                }
                Some((name.to_string(), Self::unquote(value.trim()).to_string()))
            })
            .collect()
    }

    /// 转换为HashMap，同名Cookie以第一次出现为准
    pub fn to_hashmap(header: &str) -> HashMap<String, String> {
        let mut map = HashMap::new();
        for (name, value) in Self::pairs(header) {
            map.entry(name).or_insert(value);
        }
        map
    }

    fn unquote(value: &str) -> &str {
        value
            .strip_prefix('"')
            .and_then(|v| v.strip_suffix('"'))
            .unwrap_or(value)
    }
}

/// 读取指定Cookie，名称区分大小写
pub fn get_cookie(header: &str, name: &str) -> Option<String> {
    CookieReader::pairs(header)
        .into_iter()
        .find(|(key, _)| key == name)
        .map(|(_, value)| value)
}
