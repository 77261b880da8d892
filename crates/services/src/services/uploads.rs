//! Storage of uploaded files under the public assets directory, plus WebP optimisation.

use std::path::{Path, PathBuf};

use chrono::Utc;
use image::{DynamicImage, GenericImageView, ImageFormat, imageops::FilterType};
use rand::Rng;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Public URL prefix under which stored files are referenced from the page.
pub const PUBLIC_PREFIX: &str = "./assets/images";

const MAX_WIDTH: u32 = 1200;
const MAX_HEIGHT: u32 = 800;

const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "webp", "svg"];
const DOCUMENT_EXTENSIONS: &[&str] = &["pdf"];
const OPTIMIZABLE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png"];

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("unsupported file type for field '{field}': {extension}")]
    UnsupportedType { field: String, extension: String },
    #[error("uploaded file '{0}' is empty")]
    Empty(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("image processing failed: {0}")]
    Image(#[from] image::ImageError),
    #[error("background task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// What a form field is allowed to carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadKind {
    Image,
    /// A CV: images or PDF.
    Document,
}

impl UploadKind {
    fn accepts(&self, extension: &str) -> bool {
        match self {
            UploadKind::Image => IMAGE_EXTENSIONS.contains(&extension),
            UploadKind::Document => {
                IMAGE_EXTENSIONS.contains(&extension) || DOCUMENT_EXTENSIONS.contains(&extension)
            }
        }
    }
}

/// A file received in a multipart form.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub field: String,
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl UploadedFile {
    /// Lowercased extension from the client file name, else guessed from the content type.
    pub fn extension(&self) -> Option<String> {
        let from_name = self
            .file_name
            .as_deref()
            .and_then(|name| Path::new(name).extension())
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase())
            .filter(|ext| !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()));

        from_name.or_else(|| {
            self.content_type
                .as_deref()
                .and_then(mime_guess::get_mime_extensions_str)
                .and_then(|exts| {
                    // `image/jpeg` lists `jfif` first; prefer an extension uploads accept.
                    exts.iter()
                        .find(|ext| UploadKind::Document.accepts(ext))
                        .or_else(|| exts.first())
                })
                .map(|ext| ext.to_string())
        })
    }
}

#[derive(Debug, Clone)]
pub struct UploadService {
    dir: PathBuf,
    optimize: bool,
}

impl UploadService {
    pub fn new(dir: impl Into<PathBuf>, optimize: bool) -> Self {
        Self {
            dir: dir.into(),
            optimize,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Persist `file` and return the public path to store in the database.
    pub async fn save(&self, file: &UploadedFile, kind: UploadKind) -> Result<String, UploadError> {
        if file.bytes.is_empty() {
            return Err(UploadError::Empty(file.field.clone()));
        }

        let extension = file.extension().unwrap_or_default();
        if !kind.accepts(&extension) {
            return Err(UploadError::UnsupportedType {
                field: file.field.clone(),
                extension,
            });
        }

        tokio::fs::create_dir_all(&self.dir).await?;

        let file_name = unique_file_name(&file.field, &extension);
        let path = self.dir.join(&file_name);
        tokio::fs::write(&path, &file.bytes).await?;
        info!(field = %file.field, file = %file_name, bytes = file.bytes.len(), "Stored upload");

        if self.optimize && OPTIMIZABLE_EXTENSIONS.contains(&extension.as_str()) {
            let target = path.with_extension("webp");
            match convert_to_webp(path.clone(), target.clone()).await {
                Ok(()) => {
                    if let Some(name) = target.file_name().and_then(|n| n.to_str()) {
                        return Ok(public_path(name));
                    }
                }
                Err(e) => {
                    warn!(file = %file_name, error = %e, "Image optimisation failed, keeping original");
                }
            }
        }

        Ok(public_path(&file_name))
    }

    /// Remove a file stored by [`Self::save`], with the original kept beside a WebP copy.
    ///
    /// Paths outside the upload directory are ignored. Failures are logged only.
    pub async fn discard(&self, public_path: &str) {
        let Some(name) = public_path
            .strip_prefix(PUBLIC_PREFIX)
            .map(|rest| rest.trim_start_matches('/'))
        else {
            return;
        };
        let outside = name.is_empty()
            || name.starts_with('.')
            || name.contains(|c: char| c == '/' || c == '\\');
        if outside {
            return;
        }

        let path = self.dir.join(name);
        let mut targets = vec![path.clone()];
        if path.extension().is_some_and(|ext| ext == "webp") {
            targets.extend(OPTIMIZABLE_EXTENSIONS.iter().map(|ext| path.with_extension(ext)));
        }

        for target in targets {
            match tokio::fs::remove_file(&target).await {
                Ok(()) => debug!(file = %target.display(), "Removed unused upload"),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => warn!(file = %target.display(), error = %e, "Could not remove upload"),
            }
        }
    }
}

/// `{field}-{unix millis}-{random below 1e9}.{ext}`
pub fn unique_file_name(field: &str, extension: &str) -> String {
    let suffix: u32 = rand::thread_rng().gen_range(0..1_000_000_000);
    let millis = Utc::now().timestamp_millis();
    if extension.is_empty() {
        format!("{field}-{millis}-{suffix}")
    } else {
        format!("{field}-{millis}-{suffix}.{extension}")
    }
}

pub fn public_path(file_name: &str) -> String {
    format!("{PUBLIC_PREFIX}/{file_name}")
}

fn fit_within_bounds(image: DynamicImage) -> DynamicImage {
    let (width, height) = image.dimensions();
    if width <= MAX_WIDTH && height <= MAX_HEIGHT {
        image
    } else {
        image.resize(MAX_WIDTH, MAX_HEIGHT, FilterType::Lanczos3)
    }
}

async fn convert_to_webp(source: PathBuf, target: PathBuf) -> Result<(), UploadError> {
    tokio::task::spawn_blocking(move || -> Result<(), UploadError> {
        let image = fit_within_bounds(image::open(&source)?);
        DynamicImage::ImageRgba8(image.to_rgba8()).save_with_format(&target, ImageFormat::WebP)?;
        Ok(())
    })
    .await?
}

/// One image converted by [`optimize_directory`].
#[derive(Debug, Clone)]
pub struct OptimizedImage {
    pub source: PathBuf,
    pub output: PathBuf,
    pub original_bytes: u64,
    pub optimized_bytes: u64,
}

impl OptimizedImage {
    pub fn savings_percent(&self) -> f64 {
        if self.original_bytes == 0 {
            return 0.0;
        }
        (self.original_bytes as f64 - self.optimized_bytes as f64) / self.original_bytes as f64
            * 100.0
    }
}

/// Write a `.webp` sibling for every jpg/png in `dir` that does not have one yet.
///
/// Files whose name contains `optimized` are skipped. Individual failures are logged and
/// do not stop the walk.
pub async fn optimize_directory(dir: &Path) -> Result<Vec<OptimizedImage>, UploadError> {
    let mut entries = tokio::fs::read_dir(dir).await?;
    let mut candidates = Vec::new();

    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();

        if !OPTIMIZABLE_EXTENSIONS.contains(&extension.as_str()) || name.contains("optimized") {
            continue;
        }
        candidates.push(path);
    }
    candidates.sort();

    let mut converted = Vec::new();
    for source in candidates {
        let output = source.with_extension("webp");
        if tokio::fs::try_exists(&output).await? {
            debug!(file = %source.display(), "WebP version already present");
            continue;
        }

        let original_bytes = tokio::fs::metadata(&source).await?.len();
        if let Err(e) = convert_to_webp(source.clone(), output.clone()).await {
            warn!(file = %source.display(), error = %e, "Could not optimise image");
            continue;
        }
        let optimized_bytes = tokio::fs::metadata(&output).await?.len();

        let image = OptimizedImage {
            source,
            output,
            original_bytes,
            optimized_bytes,
        };
        info!(
            file = %image.source.display(),
            original_kb = image.original_bytes / 1024,
            optimized_kb = image.optimized_bytes / 1024,
            savings_percent = image.savings_percent(),
            "Optimised image"
        );
        converted.push(image);
    }

    Ok(converted)
}
