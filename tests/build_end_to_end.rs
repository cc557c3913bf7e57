//! Full build over a temporary site tree: articles, pages, layouts, assets.

use std::{num::NonZeroUsize, path::Path};

use brezza::{
    application::{build::BuildService, error::AppError},
    config::{BuildSettings, LogFormat, LoggingSettings, ServerSettings, Settings, SiteSettings},
};
use tracing::level_filters::LevelFilter;

fn settings_for(root: &Path) -> Settings {
    Settings {
        site: SiteSettings {
            articles_dir: root.join("articles"),
            pages_dir: root.join("pages"),
            layouts_dir: root.join("layouts"),
            assets_dir: root.join("assets"),
            fonts_dir: root.join("fonts"),
            target_dir: root.join("public"),
            base_url: String::new(),
        },
        build: BuildSettings {
            concurrency: NonZeroUsize::new(4).unwrap(),
            no_header_links: false,
            no_retina: false,
            absolute_urls: false,
        },
        server: ServerSettings {
            addr: "127.0.0.1:5001".parse().unwrap(),
        },
        logging: LoggingSettings {
            level: LevelFilter::INFO,
            format: LogFormat::Compact,
        },
    }
}

async fn scaffold_site(root: &Path) {
    for dir in ["articles", "pages/projects", "layouts", "assets", "fonts"] {
        tokio::fs::create_dir_all(root.join(dir)).await.unwrap();
    }

    tokio::fs::write(
        root.join("layouts/main.html"),
        "<html data-release=\"{{ Release }}\"><head><title>{{ Title }}</title></head>\n<body>{{ content | safe }}</body></html>\n",
    )
    .await
    .unwrap();
    tokio::fs::write(
        root.join("layouts/article.html"),
        "<article>{{ Content | safe }}</article>\n",
    )
    .await
    .unwrap();

    let article = "## Introduction (#intro)\n\nA claim that needs support.[1]\n\n!fig src=\"diagram.png\" caption=\"The diagram\"\n\n```ruby\nputs 1\n```\n\n![logo](/images/logo.svg)\n\n![photo](/images/photo.jpg)\n\n[1] The supporting source.\n";
    tokio::fs::write(root.join("articles/first-post.md"), article)
        .await
        .unwrap();
    tokio::fs::write(root.join("articles/.gitkeep"), "").await.unwrap();

    tokio::fs::write(
        root.join("pages/about.html"),
        "<section><h1>{{ Title }}</h1></section>\n",
    )
    .await
    .unwrap();
    tokio::fs::write(
        root.join("pages/projects/tools.html"),
        "<p>release {{ Release }}</p>\n",
    )
    .await
    .unwrap();

    tokio::fs::write(root.join("assets/site.css"), "body {}").await.unwrap();
    tokio::fs::write(root.join("fonts/face.woff2"), "woff").await.unwrap();
}

#[tokio::test]
async fn builds_a_complete_site() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    scaffold_site(root).await;

    let settings = settings_for(root);
    let summary = BuildService::new(&settings).build().await.expect("build");

    assert_eq!(summary.articles, 1);
    assert_eq!(summary.pages, 2);

    let article = tokio::fs::read_to_string(root.join("public/first-post"))
        .await
        .expect("article output");

    // Layout composition and standard locals.
    assert!(article.starts_with("<html data-release=\"1\">"));
    assert!(article.contains("<title>first-post</title>"));
    assert!(article.contains("<article>"));

    // Transform pipeline results survive templating.
    assert!(article.contains("<h2 id=\"intro\"><a href=\"#intro\">Introduction</a></h2>"));
    assert!(article.contains("<a href=\"diagram@2x.png\">"));
    assert!(article.contains("language-ruby"));
    assert!(article.contains("<div id=\"footnotes\">"));
    assert!(article.contains("<sup id=\"footnote-1-source\">"));
    assert!(article.contains("<img src=\"/images/photo.jpg\" alt=\"photo\""));
    assert!(article.contains("data-rjs=\"2\""));
    assert!(!article.contains("logo.svg\" alt=\"logo\" data-rjs"));

    // Pages keep their relative structure with extensions stripped.
    let about = tokio::fs::read_to_string(root.join("public/about"))
        .await
        .expect("about output");
    assert!(about.contains("<h1>about</h1>"));

    let tools = tokio::fs::read_to_string(root.join("public/projects/tools"))
        .await
        .expect("tools output");
    assert!(tools.contains("release 1"));

    // Hidden entries never render.
    assert!(!root.join("public/.gitkeep").exists());

    // Static directories are linked at fixed subpaths, absolutely.
    let assets_link = tokio::fs::read_link(root.join("public/assets"))
        .await
        .expect("assets symlink");
    assert_eq!(assets_link, std::path::absolute(root.join("assets")).unwrap());
    let fonts_link = tokio::fs::read_link(root.join("public/fonts"))
        .await
        .expect("fonts symlink");
    assert_eq!(fonts_link, std::path::absolute(root.join("fonts")).unwrap());
}

#[tokio::test]
async fn rebuild_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    scaffold_site(root).await;

    let settings = settings_for(root);
    BuildService::new(&settings).build().await.expect("first build");
    BuildService::new(&settings).build().await.expect("second build");

    let article = tokio::fs::read_to_string(root.join("public/first-post"))
        .await
        .expect("article output");
    assert_eq!(article.matches("language-ruby").count(), 1);
    assert!(!article.contains("language-language"));
}

#[tokio::test]
async fn task_failures_do_not_stop_sibling_tasks() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    scaffold_site(root).await;
    // Break every article task while leaving pages intact.
    tokio::fs::remove_file(root.join("layouts/article.html"))
        .await
        .unwrap();

    let settings = settings_for(root);
    let err = BuildService::new(&settings)
        .build()
        .await
        .expect_err("build should fail");

    assert!(matches!(err, AppError::Build { failed: 1 }));

    // Sibling page and asset tasks still completed.
    assert!(root.join("public/about").exists());
    assert!(root.join("public/assets").is_symlink());
}

#[tokio::test]
async fn missing_articles_directory_aborts_before_tasks_run() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    scaffold_site(root).await;
    tokio::fs::remove_dir_all(root.join("articles")).await.unwrap();

    let settings = settings_for(root);
    let err = BuildService::new(&settings)
        .build()
        .await
        .expect_err("build should fail");

    assert!(matches!(err, AppError::Infra(_)));
    assert!(!root.join("public/about").exists());
}
