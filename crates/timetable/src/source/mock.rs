//! Fixture schedule source used in development and tests.

use async_trait::async_trait;

use super::{RawCourse, ScheduleSource};

/// Serves a fixed set of course rows instead of hitting a real portal.
#[derive(Debug, Default)]
pub struct MockPortalSource;

impl MockPortalSource {
    /// The development fixture: title, time string, location, teacher.
    pub fn fixture() -> Vec<RawCourse> {
        [
            ("高级软件工程", "星期一 3-4节", "教B-201", "张伟"),
            ("编译原理", "星期二 1-2节", "科A-505", "李静"),
            ("计算机网络", "星期三 5-6节", "教C-110", "王磊"),
            ("操作系统", "星期五 7-8节", "实验楼-302", "赵秀英"),
            ("数据结构", "星期一 7-8节", "教A-101", "陈红"),
            ("大学体育", "星期四 3-4节", "体育馆", "刘强"),
            ("算法设计", "星期二 5-7节", "科A-303", "李静"),
        ]
        .into_iter()
        .map(|(title, time_string, location, teacher)| RawCourse {
            title: title.to_string(),
            time_string: time_string.to_string(),
            location: location.to_string(),
            teacher: teacher.to_string(),
        })
        .collect()
    }
}

#[async_trait]
impl ScheduleSource for MockPortalSource {
    async fn fetch(&self) -> Result<Vec<RawCourse>, super::SourceError> {
        Ok(Self::fixture())
    }
}
