//! Web portal schedule source.
//!
//! Fetches the timetable page of a university records portal (optionally
//! logging in first) and parses the course table out of its markup.

use async_trait::async_trait;
use regex::Regex;
use reqwest::Client;
use scraper::{ElementRef, Html, Selector};
use serde::Deserialize;
use std::sync::LazyLock;
use std::time::Duration;
use tracing::{debug, info};
use url::Url;

use super::{RawCourse, ScheduleSource, SourceError};

/// Configuration for the web portal source.
#[derive(Debug, Clone, Deserialize)]
pub struct PortalConfig {
    /// Base URL of the portal
    pub base_url: String,
    /// Path of the timetable page, joined onto the base URL
    #[serde(default = "default_timetable_path")]
    pub timetable_path: String,
    /// Path of the login form, joined onto the base URL
    #[serde(default = "default_login_path")]
    pub login_path: String,
    /// Whether a login POST is required before fetching the timetable
    #[serde(default)]
    pub requires_auth: bool,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

fn default_timetable_path() -> String {
    "/schedule".to_string()
}

fn default_login_path() -> String {
    "/login".to_string()
}

// Static selectors for parsing - compiled once
static ROW_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("table tr").unwrap());
static CELL_SELECTOR: LazyLock<Selector> = LazyLock::new(|| Selector::parse("td").unwrap());
static COURSE_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("td.course").unwrap());
static TIME_SELECTOR: LazyLock<Selector> = LazyLock::new(|| Selector::parse("td.time").unwrap());
static LOCATION_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("td.location").unwrap());
static TEACHER_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("td.teacher").unwrap());
static TIME_STRING_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"星期\S\s+\d{1,2}-\d{1,2}节").unwrap());

/// Fetches and parses the timetable from a live portal.
pub struct WebPortalSource {
    config: PortalConfig,
    client: Client,
}

impl WebPortalSource {
    pub fn new(config: PortalConfig) -> Result<Self, SourceError> {
        let client = Client::builder()
            .cookie_store(true)
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self { config, client })
    }

    /// Posts the login form so the timetable request carries a session
    /// cookie.
    async fn login(&self) -> Result<(), SourceError> {
        let login_url = Url::parse(&self.config.base_url)?.join(&self.config.login_path)?;
        info!("Logging in to portal at {login_url}");

        let response = self
            .client
            .post(login_url)
            .form(&[
                ("username", self.config.username.as_str()),
                ("password", self.config.password.as_str()),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(SourceError::LoginFailed {
                status: response.status().as_u16(),
            });
        }

        Ok(())
    }
}

#[async_trait]
impl ScheduleSource for WebPortalSource {
    async fn fetch(&self) -> Result<Vec<RawCourse>, SourceError> {
        if self.config.requires_auth {
            self.login().await?;
        }

        let url = Url::parse(&self.config.base_url)?.join(&self.config.timetable_path)?;
        info!("Fetching timetable page from {url}");

        let html = self.client.get(url).send().await?.text().await?;
        let courses = parse_timetable(&html)?;

        info!("Parsed {} course rows from portal page", courses.len());
        Ok(courses)
    }
}

/// Parses course rows out of a timetable page.
///
/// Two strategies, tried per row: classed cells (`td.course` etc.), then
/// positional cells in `title, time, location, teacher` order. Either way
/// the time cell must contain a recognizable time string.
fn parse_timetable(html: &str) -> Result<Vec<RawCourse>, SourceError> {
    let document = Html::parse_document(html);
    let mut courses = Vec::new();

    for row in document.select(&ROW_SELECTOR) {
        if let Some(course) = parse_classed_row(&row).or_else(|| parse_positional_row(&row)) {
            courses.push(course);
        } else {
            debug!(
                "Skipping unrecognized timetable row: {:?}",
                row.text().collect::<String>().trim()
            );
        }
    }

    if courses.is_empty() {
        return Err(SourceError::NoTimetable);
    }

    Ok(courses)
}

fn parse_classed_row(row: &ElementRef) -> Option<RawCourse> {
    let title = cell_text(row, &COURSE_SELECTOR)?;
    let time_field = cell_text(row, &TIME_SELECTOR)?;
    let location = cell_text(row, &LOCATION_SELECTOR)?;
    let teacher = cell_text(row, &TEACHER_SELECTOR).unwrap_or_default();

    let time_string = TIME_STRING_REGEX.find(&time_field)?.as_str().to_string();

    Some(RawCourse {
        title,
        time_string,
        location,
        teacher,
    })
}

fn parse_positional_row(row: &ElementRef) -> Option<RawCourse> {
    let cells: Vec<String> = row
        .select(&CELL_SELECTOR)
        .map(|cell| cell.text().collect::<String>().trim().to_string())
        .collect();

    let [title, time_field, location, teacher] = cells.as_slice() else {
        return None;
    };

    if title.is_empty() {
        return None;
    }

    let time_string = TIME_STRING_REGEX.find(time_field)?.as_str().to_string();

    Some(RawCourse {
        title: title.clone(),
        time_string,
        location: location.clone(),
        teacher: teacher.clone(),
    })
}

fn cell_text(row: &ElementRef, selector: &Selector) -> Option<String> {
    let text = row
        .select(selector)
        .next()?
        .text()
        .collect::<String>()
        .trim()
        .to_string();
    (!text.is_empty()).then_some(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_classed_table() {
        let html = r#"
            <table>
              <tr>
                <td class="course">高级软件工程</td>
                <td class="time">星期一 3-4节</td>
                <td class="location">教B-201</td>
                <td class="teacher">张伟</td>
              </tr>
              <tr>
                <td class="course">编译原理</td>
                <td class="time">时间：星期二 1-2节（单周）</td>
                <td class="location">科A-505</td>
                <td class="teacher">李静</td>
              </tr>
            </table>
        "#;

        let courses = parse_timetable(html).unwrap();
        assert_eq!(courses.len(), 2);
        assert_eq!(courses[0].title, "高级软件工程");
        assert_eq!(courses[0].time_string, "星期一 3-4节");
        // The regex pulls the time string out of surrounding cell text.
        assert_eq!(courses[1].time_string, "星期二 1-2节");
        assert_eq!(courses[1].teacher, "李静");
    }

    #[test]
    fn test_parse_positional_table_skips_header() {
        let html = r#"
            <table>
              <tr><th>课程</th><th>时间</th><th>地点</th><th>教师</th></tr>
              <tr>
                <td>计算机网络</td>
                <td>星期三 5-6节</td>
                <td>教C-110</td>
                <td>王磊</td>
              </tr>
            </table>
        "#;

        let courses = parse_timetable(html).unwrap();
        assert_eq!(courses.len(), 1);
        assert_eq!(courses[0].title, "计算机网络");
        assert_eq!(courses[0].location, "教C-110");
    }

    #[test]
    fn test_rows_without_time_string_are_skipped() {
        let html = r#"
            <table>
              <tr><td>说明</td><td>本学期课表</td><td>-</td><td>-</td></tr>
              <tr>
                <td>操作系统</td>
                <td>星期五 7-8节</td>
                <td>实验楼-302</td>
                <td>赵秀英</td>
              </tr>
            </table>
        "#;

        let courses = parse_timetable(html).unwrap();
        assert_eq!(courses.len(), 1);
        assert_eq!(courses[0].title, "操作系统");
    }

    #[test]
    fn test_page_without_timetable_is_an_error() {
        let html = "<html><body><p>请先登录</p></body></html>";
        assert!(matches!(
            parse_timetable(html),
            Err(SourceError::NoTimetable)
        ));
    }
}
