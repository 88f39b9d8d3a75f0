use failure::Fail;
use reqwest::StatusCode;

#[derive(Debug, Fail)]
pub enum ClientError {
    #[fail(display = "request failed: {}", _0)]
    Transport(#[cause] reqwest::Error),
    #[fail(display = "server responded with {}", _0)]
    Status(StatusCode),
    #[fail(display = "invalid request url: {}", _0)]
    Url(#[cause] url::ParseError),
    #[fail(display = "failed to decode image {}: {}", _0, _1)]
    Image(String, #[cause] image::ImageError),
    #[fail(display = "i/o error: {}", _0)]
    Io(#[cause] std::io::Error),
}

impl From<reqwest::Error> for ClientError {
    fn from(e: reqwest::Error) -> Self {
        ClientError::Transport(e)
    }
}

impl From<url::ParseError> for ClientError {
    fn from(e: url::ParseError) -> Self {
        ClientError::Url(e)
    }
}

impl From<std::io::Error> for ClientError {
    fn from(e: std::io::Error) -> Self {
        ClientError::Io(e)
    }
}
