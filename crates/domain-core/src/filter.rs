//! 列表过滤条件

use std::collections::BTreeMap;

/// 过滤字段注册项：对外属性名 → 存储列表达式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilterField {
    pub attribute: &'static str,
    pub column: &'static str,
}

impl FilterField {
    pub const fn new(attribute: &'static str, column: &'static str) -> Self {
        Self { attribute, column }
    }
}

/// 过滤对象
///
/// 返回已填充的属性及其取值。一个属性有多个取值时表示成员匹配（IN），
/// 取值为空的属性不参与过滤。
pub trait ListFilter: Send + Sync {
    fn populated(&self) -> Vec<(&str, &[String])>;
}

/// 不过滤
#[derive(Debug, Clone, Copy, Default)]
pub struct NoFilter;

impl ListFilter for NoFilter {
    fn populated(&self) -> Vec<(&str, &[String])> {
        Vec::new()
    }
}

/// 由请求参数直接构造的过滤对象
///
/// 键来自调用方，未经校验；只有出现在实体白名单中的键才会进入查询。
#[derive(Debug, Clone, Default)]
pub struct QueryFilter {
    params: BTreeMap<String, Vec<String>>,
}

impl QueryFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, attribute: impl Into<String>, value: impl Into<String>) -> Self {
        self.push(attribute, value);
        self
    }

    pub fn push(&mut self, attribute: impl Into<String>, value: impl Into<String>) {
        self.params
            .entry(attribute.into())
            .or_default()
            .push(value.into());
    }

    pub fn is_empty(&self) -> bool {
        self.params.values().all(Vec::is_empty)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for QueryFilter {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut filter = Self::new();
        for (k, v) in iter {
            filter.push(k, v);
        }
        filter
    }
}

impl ListFilter for QueryFilter {
    fn populated(&self) -> Vec<(&str, &[String])> {
        self.params
            .iter()
            .filter(|(_, values)| !values.is_empty())
            .map(|(k, values)| (k.as_str(), values.as_slice()))
            .collect()
    }
}
