//! Default content inserted into empty tables on startup.

use tracing::info;

use crate::{DbPool, models::personal_info::encode_paragraphs};

const DEFAULT_CATEGORIES: &[(&str, &str)] = &[
    ("web development", "Web Development"),
    ("applications", "Applications"),
    ("web design", "Web Design"),
    ("mobile apps", "Mobile Apps"),
];

const DEFAULT_SKILLS: &[(&str, i64)] = &[
    ("Web design", 80),
    ("Graphic design", 70),
    ("Branding", 90),
    ("WordPress", 50),
];

const DEFAULT_ABOUT: &[&str] = &[
    "I'm Creative Director and UI/UX Designer from Sydney, Australia, working in web development and print media. I enjoy turning complex problems into simple, beautiful and intuitive designs.",
    "My job is to build your website so that it is functional and user-friendly but at the same time attractive. Moreover, I add personal touch to your product and make sure that is eye-catching and easy to use.",
];

async fn is_empty(pool: &DbPool, table: &str) -> Result<bool, sqlx::Error> {
    let count = on_pool!(pool, |p| {
        sqlx::query_scalar::<_, i64>(&format!("SELECT COUNT(*) FROM {table}"))
            .fetch_one(p)
            .await?
    });
    Ok(count == 0)
}

pub(crate) async fn insert_defaults(pool: &DbPool) -> Result<(), sqlx::Error> {
    if is_empty(pool, "projects").await? {
        on_pool!(pool, |p| {
            sqlx::query(
                "INSERT INTO projects (title, category, image, description) VALUES (?, ?, ?, ?)",
            )
            .bind("Finance")
            .bind("web development")
            .bind("./assets/images/project-1.jpg")
            .bind("Financial web development project")
            .execute(p)
            .await?;
        });
        info!("Seeded default project");
    }

    if is_empty(pool, "testimonials").await? {
        on_pool!(pool, |p| {
            sqlx::query("INSERT INTO testimonials (name, text, avatar, date) VALUES (?, ?, ?, ?)")
                .bind("Daniel Lewis")
                .bind("Richard was hired to create a corporate identity. We were very pleased with the work done.")
                .bind("./assets/images/avatar-1.png")
                .bind("2021-06-14")
                .execute(p)
                .await?;
        });
        info!("Seeded default testimonial");
    }

    if is_empty(pool, "personal_info").await? {
        let about: Vec<String> = DEFAULT_ABOUT.iter().map(|s| s.to_string()).collect();
        let about = encode_paragraphs(&about);
        on_pool!(pool, |p| {
            sqlx::query(
                r#"INSERT INTO personal_info
                       (id, name, title, email, phone, birthday, location, avatar, about_text)
                   VALUES (1, ?, ?, ?, ?, ?, ?, ?, ?)"#,
            )
            .bind("Richard hanrick")
            .bind("Web developer")
            .bind("richard@example.com")
            .bind("+1 (213) 352-2795")
            .bind("1982-06-23")
            .bind("Sacramento, California, USA")
            .bind("./assets/images/my-avatar.png")
            .bind(&about)
            .execute(p)
            .await?;
        });
        info!("Seeded personal info");
    }

    if is_empty(pool, "categories").await? {
        for (name, display_name) in DEFAULT_CATEGORIES {
            on_pool!(pool, |p| {
                sqlx::query("INSERT INTO categories (name, display_name) VALUES (?, ?)")
                    .bind(*name)
                    .bind(*display_name)
                    .execute(p)
                    .await?;
            });
        }
        info!(count = DEFAULT_CATEGORIES.len(), "Seeded default categories");
    }

    if is_empty(pool, "skills").await? {
        for (name, percentage) in DEFAULT_SKILLS {
            on_pool!(pool, |p| {
                sqlx::query("INSERT INTO skills (name, percentage) VALUES (?, ?)")
                    .bind(*name)
                    .bind(*percentage)
                    .execute(p)
                    .await?;
            });
        }
        info!(count = DEFAULT_SKILLS.len(), "Seeded default skills");
    }

    Ok(())
}
