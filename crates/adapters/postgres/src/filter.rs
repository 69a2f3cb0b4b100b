//! 列表过滤条件编译
//!
//! 每种实体在 `EntityKind::FILTER_FIELDS` 中静态注册可过滤属性。编译时只有已填充且在白名单中的
//! 属性会生成谓词，取值一律作为绑定参数，列表达式只来自白名单。

use std::collections::HashMap;
use std::marker::PhantomData;

use domain_core::{EntityKind, ListFilter};
use sqlx::{Postgres, QueryBuilder};
use tracing::debug;

/// 过滤编译器
pub struct FilterCompiler<K: EntityKind> {
    allowed: HashMap<&'static str, &'static str>,
    _kind: PhantomData<fn() -> K>,
}

impl<K: EntityKind> Default for FilterCompiler<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: EntityKind> FilterCompiler<K> {
    pub fn new() -> Self {
        let allowed = K::FILTER_FIELDS
            .iter()
            .map(|f| (f.attribute, f.column))
            .collect();
        Self {
            allowed,
            _kind: PhantomData,
        }
    }

    /// 属性对应的列表达式，不在白名单中返回 None
    pub fn column(&self, attribute: &str) -> Option<&'static str> {
        self.allowed.get(attribute).copied()
    }

    /// 向查询追加 WHERE 子句，返回生成的谓词数量
    ///
    /// 单个取值生成 `col = $n`，多个取值生成 `col = ANY($n)`。
    pub fn push_where(&self, qb: &mut QueryBuilder<'_, Postgres>, filter: &dyn ListFilter) -> usize {
        let mut count = 0;

        for (attribute, values) in filter.populated() {
            if values.is_empty() {
                continue;
            }
            let Some(column) = self.column(attribute) else {
                debug!(table = K::TABLE, attribute, "Skipping unknown filter attribute");
                continue;
            };

            qb.push(if count == 0 { " WHERE " } else { " AND " });
            qb.push(column);
            if let [single] = values {
                qb.push(" = ");
                qb.push_bind(single.clone());
            } else {
                qb.push(" = ANY(");
                qb.push_bind(values.to_vec());
                qb.push(")");
            }
            count += 1;
        }

        count
    }
}
