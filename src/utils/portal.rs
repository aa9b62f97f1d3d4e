use log::{debug, info};
use reqwest::Client;
use url::Url;
use urlencoding::encode;

use crate::error::GradeFetchError;
use crate::models::{Course, GradeReport};
use crate::utils::assignments::parse_assignments;
use crate::utils::courses::parse_course_list;
use crate::utils::weights::parse_weight_table;

pub const DEFAULT_BASE_URL: &str = "https://ta.yrdsb.ca/live";

// The portal expects this literal body on every request.
const REQUEST_BODY: &str = "credentials";

// Fetches grade reports from the portal. Holds no state between calls; each
// fetch opens its own PortalSession.
#[derive(Debug, Clone)]
pub struct GradeClient {
    base_url: String,
}

impl Default for GradeClient {
    fn default() -> Self {
        Self::new()
    }
}

impl GradeClient {
    pub fn new() -> Self {
        Self { base_url: DEFAULT_BASE_URL.to_string() }
    }

    pub fn with_base_url(base_url: &str) -> Result<Self, GradeFetchError> {
        Url::parse(base_url)?;
        Ok(Self { base_url: base_url.trim_end_matches('/').to_string() })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    // Logs in and returns every course with its detail data.
    pub async fn fetch_grades(&self, username: &str, password: &str) -> Result<Vec<Course>, GradeFetchError> {
        Ok(self.fetch_report(username, password).await?.courses)
    }

    // Same as fetch_grades, but also returns the rows and cells that were
    // skipped along the way.
    pub async fn fetch_report(&self, username: &str, password: &str) -> Result<GradeReport, GradeFetchError> {
        if username.trim().is_empty() {
            return Err(GradeFetchError::MissingInput("username"));
        }
        if password.trim().is_empty() {
            return Err(GradeFetchError::MissingInput("password"));
        }

        let session = PortalSession::open(&self.base_url)?;
        let landing = session.login(username, password).await?;

        let listing = parse_course_list(&landing);
        let mut report = GradeReport { courses: listing.value, skipped: listing.skipped };
        info!("Found {} courses", report.courses.len());

        // One course at a time: the session's cookie store is never shared
        // between in-flight requests.
        for course in report.courses.iter_mut() {
            let Some(link) = course.detail_link.clone() else {
                debug!("No detail link for {}", course.code);
                continue;
            };

            let detail = session.course_detail(&link).await?;
            let assignments = parse_assignments(&detail);
            let weights = parse_weight_table(&detail);
            debug!(
                "{}: {} assignments, {} weighted categories",
                course.code,
                assignments.value.len(),
                weights.value.len()
            );

            course.apply_detail(assignments.value, weights.value);
            report.skipped.extend(assignments.skipped);
            report.skipped.extend(weights.skipped);
        }

        info!(
            "Fetched {} courses, {} items skipped",
            report.courses.len(),
            report.skipped.len()
        );
        Ok(report)
    }
}

// One authenticated conversation with the portal. The cookie store lives in
// the wrapped client and is dropped with the session.
pub struct PortalSession {
    client: Client,
    base_url: String,
}

impl PortalSession {
    pub fn open(base_url: &str) -> Result<Self, GradeFetchError> {
        let client = Client::builder().cookie_store(true).build()?;
        Ok(Self { client, base_url: base_url.trim_end_matches('/').to_string() })
    }

    // Submits the login form and returns the landing page if the portal
    // accepted the credentials.
    pub async fn login(&self, username: &str, password: &str) -> Result<String, GradeFetchError> {
        let url = format!(
            "{}/index.php?username={}&password={}&submit=Login&subject_id=0",
            self.base_url,
            encode(username),
            encode(password)
        );
        let page = self.post(&url).await?;

        check_login_page(&page)?;
        info!("Logged in to {}", self.base_url);
        Ok(page)
    }

    pub async fn course_detail(&self, link: &str) -> Result<String, GradeFetchError> {
        let url = format!("{}/students/{}", self.base_url, link);
        debug!("Fetching course detail {}", link);
        self.post(&url).await
    }

    async fn post(&self, url: &str) -> Result<String, GradeFetchError> {
        let response = self.client.post(url).body(REQUEST_BODY).send().await?;
        Ok(response.text().await?)
    }
}

// Classifies a login response by the portal's error banners, in order.
pub fn check_login_page(page: &str) -> Result<(), GradeFetchError> {
    if page.contains("Invalid Login") {
        Err(GradeFetchError::InvalidLogin)
    } else if page.contains("Access Denied") {
        Err(GradeFetchError::AccessDenied)
    } else if page.contains("Session Expired") {
        Err(GradeFetchError::SessionExpired)
    } else {
        Ok(())
    }
}
