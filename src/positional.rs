/// 位置参数描述
///
/// 按顺序把不带 `--name` 的参数分配给已声明的选项。
/// `max_count` 为 `None` 表示不限个数，只能出现在最后。
///
/// # 示例
/// ```
/// use optreg::PositionalSpec;
///
/// let spec = PositionalSpec::new()
///     .add("output", Some(1))
///     .add("input", None);
/// assert_eq!(spec.entries().len(), 2);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PositionalSpec {
    entries: Vec<(String, Option<usize>)>,
}

impl PositionalSpec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(mut self, name: impl Into<String>, max_count: Option<usize>) -> Self {
        self.entries.push((name.into(), max_count));
        self
    }

    pub fn entries(&self) -> &[(String, Option<usize>)] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 第 `position` 个位置参数对应的选项名
    pub fn name_for_position(&self, position: usize) -> Option<&str> {
        let mut start = 0;
        for (name, max_count) in &self.entries {
            match max_count {
                None => return Some(name),
                Some(count) if position < start + count => return Some(name),
                Some(count) => start += count,
            }
        }
        None
    }
}
