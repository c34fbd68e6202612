use actix_web::http::StatusCode;
use actix_web::http::header::ContentType;
use actix_web::{HttpResponse, ResponseError};
use std::io::ErrorKind;
use std::path::PathBuf;
use tokio::fs;

const INDEX_HTML: &str = include_str!("../../templates/index.html");
const NOTICE_SLOT: &str = "{{ notice }}";

pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#x27;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// The upload form, optionally carrying one error notice.
pub fn render_upload_form(notice: Option<&str>) -> String {
    let notice_html = notice
        .map(|message| {
            format!(
                r#"<ul class="flashes"><li class="error">{}</li></ul>"#,
                escape_html(message)
            )
        })
        .unwrap_or_default();
    INDEX_HTML.replace(NOTICE_SLOT, &notice_html)
}

pub fn html_ok(body: String) -> HttpResponse {
    HttpResponse::Ok().content_type(ContentType::html()).body(body)
}

#[derive(Debug, thiserror::Error)]
pub enum PageError {
    #[error("No recipe page found for '{0}'")]
    NotFound(String),
    #[error("Failed to read recipe page: {0}")]
    Io(#[from] std::io::Error),
}

impl ResponseError for PageError {
    fn status_code(&self) -> StatusCode {
        match self {
            PageError::NotFound(_) => StatusCode::NOT_FOUND,
            PageError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let body = match self {
            PageError::NotFound(biscuit) => {
                format!("<h1>No recipe page found for '{}'</h1>", escape_html(biscuit))
            }
            PageError::Io(_) => "<h1>Internal server error</h1>".to_string(),
        };
        HttpResponse::build(self.status_code())
            .content_type(ContentType::html())
            .body(body)
    }
}

/// Static result pages, one `<label>.html` file per biscuit class.
#[derive(Clone, Debug)]
pub struct RecipePages {
    biscuits_dir: PathBuf,
}

// Labels are used verbatim as file stems.
fn is_page_name(biscuit: &str) -> bool {
    !biscuit.is_empty()
        && biscuit != "."
        && biscuit != ".."
        && !biscuit.contains(['/', '\\', '\0'])
}

impl RecipePages {
    pub fn new(biscuits_dir: impl Into<PathBuf>) -> Self {
        Self {
            biscuits_dir: biscuits_dir.into(),
        }
    }

    pub async fn render(&self, biscuit: &str) -> Result<String, PageError> {
        if !is_page_name(biscuit) {
            return Err(PageError::NotFound(biscuit.to_string()));
        }

        let path = self.biscuits_dir.join(format!("{}.html", biscuit));
        match fs::read_to_string(&path).await {
            Ok(page) => Ok(page),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                log::info!("No recipe page for {:?}", biscuit);
                Err(PageError::NotFound(biscuit.to_string()))
            }
            Err(e) => {
                log::error!("Failed to read recipe page {}: {}", path.display(), e);
                Err(PageError::Io(e))
            }
        }
    }
}
