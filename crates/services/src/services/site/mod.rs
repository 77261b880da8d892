//! Regenerates the public page by rewriting marker-delimited regions of the template.

mod fragments;

use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use db::{
    DBService,
    models::{
        blog::Blog, category::Category, client::Client, education::Education,
        experience::Experience, personal_info::PersonalInfo,
        portfolio_project::PortfolioProject, project::Project, skill::Skill,
        social_link::SocialLink, testimonial::Testimonial,
    },
};
use regex::{Captures, Regex};
use strum::IntoEnumIterator;
use strum_macros::{Display, EnumIter};
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, info};

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("io error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid region pattern: {0}")]
    Pattern(#[from] regex::Error),
}

/// A section of the page delimited by `<!-- NAME_START -->` / `<!-- NAME_END -->`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum Region {
    Projects,
    Testimonials,
    Portfolio,
    Clients,
    CategoryFilters,
    CategorySelect,
    Blogs,
    PersonalInfo,
    Contacts,
    About,
    SocialLinks,
    Education,
    Experience,
    Skills,
}

impl Region {
    pub fn start_marker(&self) -> String {
        format!("<!-- {self}_START -->")
    }

    pub fn end_marker(&self) -> String {
        format!("<!-- {self}_END -->")
    }

    fn pattern(&self) -> Result<Regex, regex::Error> {
        Regex::new(&format!(
            r"(?s)({})(.*?)({})",
            regex::escape(&self.start_marker()),
            regex::escape(&self.end_marker())
        ))
    }
}

/// Everything the page shows, read in one pass.
#[derive(Debug, Clone, Default)]
pub struct SiteSnapshot {
    pub projects: Vec<Project>,
    pub testimonials: Vec<Testimonial>,
    pub portfolio_projects: Vec<PortfolioProject>,
    pub clients: Vec<Client>,
    pub categories: Vec<Category>,
    pub blogs: Vec<Blog>,
    pub personal_info: Option<PersonalInfo>,
    pub social_links: Vec<SocialLink>,
    pub education: Vec<Education>,
    pub experience: Vec<Experience>,
    pub skills: Vec<Skill>,
}

impl SiteSnapshot {
    pub async fn load(db: &DBService) -> Result<Self, sqlx::Error> {
        let pool = &db.pool;
        Ok(Self {
            projects: Project::find_all(pool).await?,
            testimonials: Testimonial::find_all(pool).await?,
            portfolio_projects: PortfolioProject::find_all(pool).await?,
            clients: Client::find_all(pool).await?,
            categories: Category::find_all(pool).await?,
            blogs: Blog::find_all(pool).await?,
            personal_info: PersonalInfo::get(pool).await?,
            social_links: SocialLink::find_all(pool).await?,
            education: Education::find_all(pool).await?,
            experience: Experience::find_all(pool).await?,
            skills: Skill::find_all(pool).await?,
        })
    }

    pub fn render(&self, region: Region) -> String {
        fragments::render(region, self)
    }
}

/// Outcome of one regeneration.
#[derive(Debug, Clone, Default)]
pub struct RenderReport {
    pub replaced: Vec<Region>,
    /// Regions whose markers are not in the template.
    pub missing: Vec<Region>,
}

#[derive(Debug, Clone)]
pub struct SiteRenderer {
    template_path: PathBuf,
    output_path: PathBuf,
    patterns: Arc<Vec<(Region, Regex)>>,
    lock: Arc<Mutex<()>>,
}

impl SiteRenderer {
    pub fn new(
        template_path: impl Into<PathBuf>,
        output_path: impl Into<PathBuf>,
    ) -> Result<Self, RenderError> {
        let patterns = Region::iter()
            .map(|region| Ok((region, region.pattern()?)))
            .collect::<Result<Vec<_>, regex::Error>>()?;

        Ok(Self {
            template_path: template_path.into(),
            output_path: output_path.into(),
            patterns: Arc::new(patterns),
            lock: Arc::new(Mutex::new(())),
        })
    }

    pub fn output_path(&self) -> &Path {
        &self.output_path
    }

    /// Replace the first occurrence of every known region in `page`.
    pub fn render_page(&self, page: &str, site: &SiteSnapshot) -> (String, RenderReport) {
        let mut page = page.to_string();
        let mut report = RenderReport::default();

        for (region, pattern) in self.patterns.iter() {
            if !pattern.is_match(&page) {
                report.missing.push(*region);
                continue;
            }
            let fragment = site.render(*region);
            page = pattern
                .replacen(&page, 1, |caps: &Captures| {
                    format!("{}\n{}\n{}", &caps[1], fragment, &caps[3])
                })
                .into_owned();
            report.replaced.push(*region);
        }

        (page, report)
    }

    /// Load content, rewrite every region and atomically replace the output page.
    ///
    /// Concurrent calls run one at a time.
    pub async fn regenerate(&self, db: &DBService) -> Result<RenderReport, RenderError> {
        let _guard = self.lock.lock().await;

        let site = SiteSnapshot::load(db).await?;
        let template = tokio::fs::read_to_string(&self.template_path)
            .await
            .map_err(|source| RenderError::Io {
                path: self.template_path.clone(),
                source,
            })?;

        let (page, report) = self.render_page(&template, &site);
        write_atomically(&self.output_path, &page).await?;

        if !report.missing.is_empty() {
            debug!(missing = ?report.missing, "Template regions without markers");
        }
        info!(
            output = %self.output_path.display(),
            regions = report.replaced.len(),
            "Regenerated site page"
        );
        Ok(report)
    }
}

async fn write_atomically(path: &Path, contents: &str) -> Result<(), RenderError> {
    let mut tmp_name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| "index.html".into());
    tmp_name.push(".tmp");
    let tmp = path.with_file_name(tmp_name);

    let io_err = |path: &Path| {
        let path = path.to_path_buf();
        move |source| RenderError::Io { path, source }
    };

    tokio::fs::write(&tmp, contents).await.map_err(io_err(&tmp))?;
    tokio::fs::rename(&tmp, path).await.map_err(io_err(path))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use db::models::{
        category::{CreateCategory, UpdateCategory},
        portfolio_project::CreatePortfolioProject,
    };
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    use super::*;

    const TEMPLATE: &str = r#"<html>
<ul class="service-list">
<!-- PROJECTS_START -->
<li>stale</li>
<!-- PROJECTS_END -->
</ul>
<ul class="filter-list">
<!-- CATEGORY_FILTERS_START --><!-- CATEGORY_FILTERS_END -->
</ul>
<ul class="project-list">
<!-- PORTFOLIO_START -->
<!-- PORTFOLIO_END -->
</ul>
</html>
"#;

    fn renderer(dir: &TempDir) -> SiteRenderer {
        let path = dir.path().join("index.html");
        std::fs::write(&path, TEMPLATE).unwrap();
        SiteRenderer::new(&path, &path).unwrap()
    }

    #[test]
    fn test_region_markers() {
        assert_eq!(Region::CategoryFilters.start_marker(), "<!-- CATEGORY_FILTERS_START -->");
        assert_eq!(Region::SocialLinks.end_marker(), "<!-- SOCIAL_LINKS_END -->");
        assert_eq!(Region::iter().count(), 14);
    }

    #[test]
    fn test_only_first_region_is_replaced_and_markers_kept() {
        let dir = TempDir::new().unwrap();
        let renderer = renderer(&dir);
        let page = "<!-- ABOUT_START -->old<!-- ABOUT_END -->\n<!-- ABOUT_START -->second<!-- ABOUT_END -->";
        let site = SiteSnapshot::default();

        let (out, report) = renderer.render_page(page, &site);
        assert_eq!(
            out,
            "<!-- ABOUT_START -->\n\n<!-- ABOUT_END -->\n<!-- ABOUT_START -->second<!-- ABOUT_END -->"
        );
        assert_eq!(report.replaced, vec![Region::About]);
        assert_eq!(report.missing.len(), 13);
    }

    #[test]
    fn test_dollar_signs_in_content_are_literal() {
        let dir = TempDir::new().unwrap();
        let renderer = renderer(&dir);
        let mut site = SiteSnapshot::default();
        site.skills.push(Skill {
            id: 1,
            name: "$1 budgeting".into(),
            percentage: 10,
            created_at: chrono::Utc::now(),
        });

        let (out, _) = renderer.render_page("<!-- SKILLS_START --><!-- SKILLS_END -->", &site);
        assert!(out.contains("$1 budgeting"));
    }

    #[tokio::test]
    async fn test_regenerate_writes_fragments_from_store() {
        let dir = TempDir::new().unwrap();
        let renderer = renderer(&dir);
        let db = DBService::new_in_memory().await.unwrap();

        PortfolioProject::create(
            &db.pool,
            &CreatePortfolioProject {
                title: "Orizon".into(),
                category: "Web Design".into(),
                filter_category: Some("web design".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        let report = renderer.regenerate(&db).await.unwrap();
        assert_eq!(
            report.replaced,
            vec![Region::Projects, Region::Portfolio, Region::CategoryFilters]
        );

        let page = std::fs::read_to_string(renderer.output_path()).unwrap();
        assert!(!page.contains("stale"));
        assert!(page.contains("Finance"));
        assert!(page.contains(r#"data-category="web design""#));
        assert!(page.contains(r#"data-filter="mobile apps">Mobile Apps<"#));
        assert!(page.contains("<!-- PROJECTS_START -->\n"));
        assert!(page.contains("\n<!-- PROJECTS_END -->"));
        assert!(!dir.path().join("index.html.tmp").exists());
    }

    #[tokio::test]
    async fn test_category_rename_reaches_the_page() {
        let dir = TempDir::new().unwrap();
        let renderer = renderer(&dir);
        let db = DBService::new_in_memory().await.unwrap();

        let category = Category::create(
            &db.pool,
            &CreateCategory {
                name: "games".into(),
                display_name: "Games".into(),
            },
        )
        .await
        .unwrap();
        PortfolioProject::create(
            &db.pool,
            &CreatePortfolioProject {
                title: "Tetris".into(),
                category: "Games".into(),
                filter_category: Some("games".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        Category::update_with_cascade(
            &db.pool,
            category.id,
            &UpdateCategory {
                name: Some("video games".into()),
                display_name: Some("Video Games".into()),
            },
        )
        .await
        .unwrap()
        .unwrap();

        renderer.regenerate(&db).await.unwrap();
        let page = std::fs::read_to_string(renderer.output_path()).unwrap();
        assert!(page.contains(r#"data-category="video games""#));
        assert!(page.contains(r#"<p class="project-category">Video Games</p>"#));
        assert!(!page.contains(r#"data-category="games""#));
    }

    #[tokio::test]
    async fn test_missing_template_is_an_error() {
        let dir = TempDir::new().unwrap();
        let renderer = SiteRenderer::new(dir.path().join("nope.html"), dir.path().join("out.html"))
            .unwrap();
        let db = DBService::new_in_memory().await.unwrap();
        assert!(matches!(
            renderer.regenerate(&db).await,
            Err(RenderError::Io { .. })
        ));
    }

    #[tokio::test]
    async fn test_concurrent_regenerations_are_serialized() {
        let dir = TempDir::new().unwrap();
        let renderer = renderer(&dir);
        let db = DBService::new_in_memory().await.unwrap();

        let results = tokio::join!(
            renderer.regenerate(&db),
            renderer.regenerate(&db),
            renderer.regenerate(&db),
            renderer.regenerate(&db),
        );
        for result in [results.0, results.1, results.2, results.3] {
            assert_eq!(result.unwrap().replaced.len(), 3);
        }

        let page = std::fs::read_to_string(renderer.output_path()).unwrap();
        assert!(page.starts_with("<html>"));
        assert!(page.trim_end().ends_with("</html>"));
        assert_eq!(page.matches("<!-- PROJECTS_START -->").count(), 1);

        renderer.regenerate(&db).await.unwrap();
        let single = std::fs::read_to_string(renderer.output_path()).unwrap();
        assert_eq!(page, single);

        let leftovers: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_name().to_string_lossy().ends_with(".tmp"))
            .collect();
        assert!(leftovers.is_empty());
    }
}
