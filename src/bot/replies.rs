//! User-facing message texts.

use crate::Error;

pub const GREETING: &str = "Привет от старых штиблет! Жми /pic, чтобы создать изображение. Качество не гарантирую. Трах тибидох!";
pub const ASK_DESCRIPTION: &str = "Введите описание для изображения:";
pub const GENERATING: &str = "Генерирую изображение, пожалуйста, подождите...";
pub const CAPTION: &str = "Вот ваше изображение! (Seed: {{seed}})";
pub const API_REQUEST_FAILED: &str = "Ошибка запроса к API: {{error}}";
pub const NO_IMAGE: &str = "Ошибка: Ответ не содержит изображения";
pub const TIMED_OUT: &str = "Превышено время ожидания результата";
pub const UNEXPECTED: &str = "Произошла ошибка: {{error}}";

/// Replace `{{key}}` placeholders in a template string.
pub fn render(template: &str, vars: &[(&str, &str)]) -> String {
    let mut result = template.to_string();
    for (key, value) in vars {
        result = result.replace(&format!("{{{{{}}}}}", key), value);
    }
    result
}

pub fn caption(seed: u64) -> String {
    render(CAPTION, &[("seed", seed.to_string().as_str())])
}

/// Text shown to the user when a generation attempt fails.
pub fn for_error(err: &Error) -> String {
    match err {
        Error::Submit(detail) | Error::Poll(detail) => {
            render(API_REQUEST_FAILED, &[("error", detail.as_str())])
        }
        Error::MissingImage(_) => NO_IMAGE.to_string(),
        Error::Timeout(_) => TIMED_OUT.to_string(),
        other => render(UNEXPECTED, &[("error", other.to_string().as_str())]),
    }
}
