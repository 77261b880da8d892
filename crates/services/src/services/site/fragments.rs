//! HTML fragments injected into each template region.

use db::models::{
    blog::Blog,
    category::Category,
    client::Client,
    education::Education,
    experience::Experience,
    personal_info::PersonalInfo,
    portfolio_project::PortfolioProject,
    project::Project,
    skill::Skill,
    social_link::SocialLink,
    testimonial::{DEFAULT_AVATAR, Testimonial},
};
use utils::text::escape_html as esc;

use super::{Region, SiteSnapshot};

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn join<T>(items: &[T], render: impl Fn(&T) -> String) -> String {
    items.iter().map(render).collect::<Vec<_>>().join("\n")
}

pub fn render(region: Region, site: &SiteSnapshot) -> String {
    match region {
        Region::Projects => join(&site.projects, project),
        Region::Testimonials => join(&site.testimonials, testimonial),
        Region::Portfolio => join(&site.portfolio_projects, portfolio_item),
        Region::Clients => join(&site.clients, client),
        Region::CategoryFilters => category_filters(&site.categories),
        Region::CategorySelect => category_select(&site.categories),
        Region::Blogs => join(&site.blogs, blog),
        Region::PersonalInfo => site.personal_info.as_ref().map(sidebar_info).unwrap_or_default(),
        Region::Contacts => site.personal_info.as_ref().map(contacts).unwrap_or_default(),
        Region::About => site.personal_info.as_ref().map(about).unwrap_or_default(),
        Region::SocialLinks => join(&site.social_links, social_link),
        Region::Education => join(&site.education, education),
        Region::Experience => join(&site.experience, experience),
        Region::Skills => join(&site.skills, skill),
    }
}

fn project(p: &Project) -> String {
    format!(
        r#"                <li class="service-item">
                    <div class="service-icon-box">
                        <img src="{image}" alt="{title}" width="40">
                    </div>
                    <div class="service-content-box">
                        <h4 class="h4 service-item-title">{title}</h4>
                        <p class="service-item-text">
                            {description}
                        </p>
                    </div>
                </li>"#,
        image = esc(non_empty(&p.image).unwrap_or_default()),
        title = esc(&p.title),
        description = esc(non_empty(&p.description).unwrap_or_default()),
    )
}

fn testimonial(t: &Testimonial) -> String {
    format!(
        r#"                <li class="testimonials-item">
                    <div class="content-card" data-testimonials-item>
                        <figure class="testimonials-avatar-box">
                            <img src="{avatar}" alt="{name}" width="60" data-testimonials-avatar>
                        </figure>
                        <h4 class="h4 testimonials-item-title" data-testimonials-title>{name}</h4>
                        <div class="testimonials-text" data-testimonials-text>
                            <p>{text}</p>
                        </div>
                    </div>
                </li>"#,
        avatar = esc(non_empty(&t.avatar).unwrap_or(DEFAULT_AVATAR)),
        name = esc(&t.name),
        text = esc(&t.text),
    )
}

fn portfolio_item(p: &PortfolioProject) -> String {
    let mut links = String::new();
    if let Some(repo) = non_empty(&p.repo_link) {
        links.push_str(&format!(
            r#"
                        <a href="{}" target="_blank" class="project-link repo-link" title="View code">
                            <ion-icon name="logo-github"></ion-icon>
                        </a>"#,
            esc(repo)
        ));
    }
    if let Some(live) = non_empty(&p.live_link) {
        links.push_str(&format!(
            r#"
                        <a href="{}" target="_blank" class="project-link live-link" title="View site">
                            <ion-icon name="eye-outline"></ion-icon>
                        </a>"#,
            esc(live)
        ));
    }

    format!(
        r#"                <li class="project-item active" data-filter-item data-category="{filter}">
                    <div class="project-links">{links}
                    </div>
                    <figure class="project-img">
                        <div class="project-item-icon-box">
                            <ion-icon name="eye-outline"></ion-icon>
                        </div>
                        <img src="{image}" alt="{title}" loading="lazy" />
                    </figure>
                    <h3 class="project-title">{title}</h3>
                    <p class="project-category">{category}</p>
                </li>"#,
        filter = esc(p.filter_key()),
        image = esc(non_empty(&p.image).unwrap_or_default()),
        title = esc(&p.title),
        category = esc(&p.category),
    )
}

fn client(c: &Client) -> String {
    format!(
        r#"                <li class="clients-item">
                    <a href="{website}" target="_blank" title="{name}">
                        <img src="{logo}" alt="{name} logo" />
                    </a>
                </li>"#,
        website = esc(non_empty(&c.website).unwrap_or("#")),
        name = esc(&c.name),
        logo = esc(non_empty(&c.logo).unwrap_or_default()),
    )
}

fn category_filters(categories: &[Category]) -> String {
    let mut items = vec![
        r#"                <li class="filter-item"><button class="active" data-filter-btn data-filter="all">All</button></li>"#
            .to_string(),
    ];
    items.extend(categories.iter().map(|c| {
        format!(
            r#"                <li class="filter-item"><button data-filter-btn data-filter="{}">{}</button></li>"#,
            esc(&c.name),
            esc(&c.display_name)
        )
    }));
    items.join("\n")
}

fn category_select(categories: &[Category]) -> String {
    let mut items = vec![
        r#"                <li class="select-item"><button data-select-item data-filter="all">All</button></li>"#
            .to_string(),
    ];
    items.extend(categories.iter().map(|c| {
        format!(
            r#"                <li class="select-item"><button data-select-item data-filter="{}">{}</button></li>"#,
            esc(&c.name),
            esc(&c.display_name)
        )
    }));
    items.join("\n")
}

fn blog(b: &Blog) -> String {
    let slug = non_empty(&b.slug).unwrap_or_default();
    format!(
        r#"                <li class="blog-post-item">
                    <a href="./blog.html?slug={slug}" data-blog-slug="{slug}">
                        <figure class="blog-banner-box">
                            <img src="{image}" alt="{title}" loading="lazy">
                        </figure>
                        <div class="blog-content">
                            <div class="blog-meta">
                                <p class="blog-category">{category}</p>
                                <span class="dot"></span>
                                <time datetime="{date}">{date}</time>
                            </div>
                            <h3 class="h3 blog-item-title">{title}</h3>
                            <p class="blog-text">{excerpt}</p>
                        </div>
                    </a>
                </li>"#,
        slug = esc(slug),
        image = esc(non_empty(&b.image).unwrap_or_default()),
        title = esc(&b.title),
        category = esc(&b.category),
        date = esc(non_empty(&b.date).unwrap_or_default()),
        excerpt = esc(non_empty(&b.excerpt).unwrap_or_default()),
    )
}

fn sidebar_info(info: &PersonalInfo) -> String {
    format!(
        r#"                <figure class="avatar-box">
                    <img src="{avatar}" alt="{name}" width="80">
                </figure>
                <div class="info-content">
                    <h1 class="name" title="{name}">{name}</h1>
                    <p class="title">{title}</p>
                </div>"#,
        avatar = esc(non_empty(&info.avatar).unwrap_or_default()),
        name = esc(&info.name),
        title = esc(&info.title),
    )
}

fn contact_item(icon: &str, label: &str, value: String) -> String {
    format!(
        r#"                <li class="contact-item">
                    <div class="icon-box">
                        <ion-icon name="{icon}"></ion-icon>
                    </div>
                    <div class="contact-info">
                        <p class="contact-title">{label}</p>
                        {value}
                    </div>
                </li>"#
    )
}

fn contacts(info: &PersonalInfo) -> String {
    let email = esc(&info.email);
    let phone = esc(&info.phone);
    let phone_href: String = info
        .phone
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '+')
        .collect();
    let birthday = esc(&info.birthday);

    let mut items = vec![
        contact_item(
            "mail-outline",
            "Email",
            format!(r#"<a href="mailto:{email}" class="contact-link">{email}</a>"#),
        ),
        contact_item(
            "phone-portrait-outline",
            "Phone",
            format!(r#"<a href="tel:{phone_href}" class="contact-link">{phone}</a>"#),
        ),
        contact_item(
            "calendar-outline",
            "Birthday",
            format!(r#"<time datetime="{birthday}">{birthday}</time>"#),
        ),
        contact_item(
            "location-outline",
            "Location",
            format!("<address>{}</address>", esc(&info.location)),
        ),
    ];

    if let Some(cv) = non_empty(&info.cv_file) {
        items.push(contact_item(
            "document-outline",
            "Resume",
            format!(r#"<a href="{}" class="contact-link" download>Download CV</a>"#, esc(cv)),
        ));
    }

    items.join("\n")
}

fn about(info: &PersonalInfo) -> String {
    info.paragraphs()
        .iter()
        .map(|p| format!("                <p>{}</p>", esc(p)))
        .collect::<Vec<_>>()
        .join("\n")
}

fn social_link(link: &SocialLink) -> String {
    format!(
        r#"                <li class="social-item">
                    <a href="{url}" class="social-link" target="_blank" title="{name}">
                        <ion-icon name="{icon}"></ion-icon>
                    </a>
                </li>"#,
        url = esc(&link.url),
        name = esc(&link.name),
        icon = esc(&link.icon),
    )
}

fn timeline_item(title: &str, period: &str, description: &Option<String>) -> String {
    format!(
        r#"                <li class="timeline-item">
                    <h4 class="h4 timeline-item-title">{}</h4>
                    <span>{}</span>
                    <p class="timeline-text">{}</p>
                </li>"#,
        esc(title),
        esc(period),
        esc(non_empty(description).unwrap_or_default()),
    )
}

fn education(e: &Education) -> String {
    timeline_item(&e.institution, &e.period, &e.description)
}

fn experience(e: &Experience) -> String {
    timeline_item(&e.position, &e.period, &e.description)
}

fn skill(s: &Skill) -> String {
    let value = s.percentage.clamp(0, 100);
    format!(
        r#"                <li class="skills-item">
                    <div class="title-wrapper">
                        <h5 class="h5">{name}</h5>
                        <data value="{value}">{value}%</data>
                    </div>
                    <div class="skill-progress-bg">
                        <div class="skill-progress-fill" style="width: {value}%;"></div>
                    </div>
                </li>"#,
        name = esc(&s.name),
    )
}
