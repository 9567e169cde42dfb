//! HTTP Request
use bytes::BytesMut;
use std::{cell::OnceCell, collections::HashMap, net::SocketAddr};

use crate::{
    body::Body,
    config::Config,
    h1::parser::RequestHead,
    headers::Headers,
    http::{Method, Target, Version},
    multipart::{FileHeader, MultipartForm, MultipartReader},
};

mod decode;
mod form;

pub use form::{Form, FormError};

use decode::{ContentType, parse_content_type, parse_cookies, parse_query};

/// HTTP Request.
///
/// Query string and cookies are parsed on first access, the form is decoded at most once and the
/// outcome is cached.
pub struct Request<'a> {
    head: RequestHead,
    body: Body<'a>,
    remote_addr: Option<SocketAddr>,
    content_type: Option<ContentType>,
    queries: OnceCell<HashMap<String, String>>,
    cookies: OnceCell<HashMap<String, String>>,
    form: Option<Result<Form, FormError>>,
    config: &'a Config,
}

/// Constructor
impl<'a> Request<'a> {
    pub(crate) fn new(
        head: RequestHead,
        body: Body<'a>,
        remote_addr: Option<SocketAddr>,
        config: &'a Config,
    ) -> Self {
        let content_type = head.headers.get("content-type").map(parse_content_type);
        Self {
            head,
            body,
            remote_addr,
            content_type,
            queries: OnceCell::new(),
            cookies: OnceCell::new(),
            form: None,
            config,
        }
    }
}

impl<'a> Request<'a> {
    delegate! {
        /// Returns shared reference to [`Method`].
        method -> Method;

        /// Returns shared reference to the request [`Target`].
        target -> Target;

        /// Returns shared reference to [`Version`].
        version -> Version;

        /// Returns shared reference to [`Headers`].
        headers -> Headers;
    }

    /// Returns the percent-decoded request path.
    #[inline]
    pub fn path(&self) -> &str {
        self.head.target.path()
    }

    /// Returns the first value of given header name.
    #[inline]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.head.headers.get(name)
    }

    /// Returns the peer address, if the transport has one.
    #[inline]
    pub fn remote_addr(&self) -> Option<SocketAddr> {
        self.remote_addr
    }

    /// Returns shared reference to [`Body`].
    #[inline]
    pub fn body(&self) -> &Body<'a> {
        &self.body
    }

    /// Returns mutable reference to [`Body`].
    #[inline]
    pub fn body_mut(&mut self) -> &mut Body<'a> {
        &mut self.body
    }
}

// ===== Query and Cookies =====

impl Request<'_> {
    /// Returns every query string pair.
    pub fn queries(&self) -> &HashMap<String, String> {
        self.queries
            .get_or_init(|| self.head.target.query().map(parse_query).unwrap_or_default())
    }

    /// Returns query string value of given key.
    pub fn query(&self, name: &str) -> Option<&str> {
        self.queries().get(name).map(String::as_str)
    }

    /// Returns every cookie.
    pub fn cookies(&self) -> &HashMap<String, String> {
        self.cookies.get_or_init(|| parse_cookies(&self.head.headers))
    }

    /// Returns cookie value of given name.
    pub fn cookie(&self, name: &str) -> Option<&str> {
        self.cookies().get(name).map(String::as_str)
    }

    /// Returns the lowercased media type of the `Content-Type` header.
    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_ref().map(|ct| ct.media.as_str())
    }

    /// Returns the `boundary` parameter of the `Content-Type` header.
    pub fn boundary(&self) -> Option<&str> {
        self.content_type.as_ref()?.boundary.as_deref()
    }
}

// ===== Form =====

impl<'a> Request<'a> {
    /// Returns a streaming multipart reader over the body.
    ///
    /// The reader does not check the media type, only the `boundary` parameter is required.
    pub fn multipart_reader(&mut self) -> Result<MultipartReader<'_, 'a>, FormError> {
        let boundary = self
            .content_type
            .as_ref()
            .and_then(|ct| ct.boundary.as_deref())
            .ok_or(FormError::MissingBoundary)?;
        Ok(MultipartReader::new(&mut self.body, boundary))
    }

    /// Decode the request form.
    ///
    /// Only `POST` and `PUT` requests have a form. The body is decoded once, later calls return
    /// the cached outcome.
    pub async fn form(&mut self) -> Result<&Form, FormError> {
        let form = match self.form.take() {
            Some(form) => form,
            None => self.decode_form().await,
        };
        self.form.insert(form).as_ref().map_err(FormError::clone)
    }

    async fn decode_form(&mut self) -> Result<Form, FormError> {
        if !self.head.method.accepts_body() {
            return Err(FormError::MissingBody);
        }

        match self.content_type.as_ref().map(|ct| ct.media.as_str()) {
            Some("application/x-www-form-urlencoded") => {
                let limit = self.config.get_max_form_memory();
                let mut buf = BytesMut::new();
                while self.body.read_buf(&mut buf).await? != 0 {
                    if buf.len() as u64 > limit {
                        return Err(FormError::TooLarge);
                    }
                }
                Ok(Form::UrlEncoded(parse_query(&String::from_utf8_lossy(&buf))))
            }
            Some("multipart/form-data") => {
                let boundary = self
                    .content_type
                    .as_ref()
                    .and_then(|ct| ct.boundary.as_deref())
                    .ok_or(FormError::MissingBoundary)?;
                let mut reader = MultipartReader::new(&mut self.body, boundary);
                Ok(Form::Multipart(reader.read_form(self.config).await?))
            }
            _ => Err(FormError::UnsupportedType),
        }
    }

    /// Returns form value of given name, `None` if the form cannot be decoded.
    pub async fn post_form(&mut self, name: &str) -> Option<&str> {
        self.form().await.ok()?.value(name)
    }

    /// Decode `multipart/form-data` form.
    pub async fn multipart_form(&mut self) -> Result<&MultipartForm, FormError> {
        match self.form().await? {
            Form::Multipart(form) => Ok(form),
            Form::UrlEncoded(_) => Err(FormError::NotMultipart),
        }
    }

    /// Returns multipart file of given form name.
    pub async fn form_file(&mut self, name: &str) -> Result<&FileHeader, FormError> {
        self.multipart_form()
            .await?
            .file(name)
            .ok_or(FormError::MissingFile)
    }

    /// Remove temporary files of a decoded multipart form.
    pub(crate) fn cleanup(&mut self) {
        if let Some(Ok(Form::Multipart(form))) = &mut self.form {
            form.remove_all();
        }
    }
}

impl std::fmt::Debug for Request<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Request")
            .field("method", &self.head.method)
            .field("target", &self.head.target)
            .field("version", &self.head.version)
            .field("headers", &self.head.headers)
            .field("remote_addr", &self.remote_addr)
            .field("body", &self.body)
            .finish()
    }
}

// ===== Macros =====

macro_rules! delegate {
    (
        $(
            $(#[$doc:meta])*
            $field:ident -> $ty:ty;
        )*
    ) => {
        $(
            $(#[$doc])*
            #[inline]
            pub fn $field(&self) -> &$ty {
                &self.head.$field
            }
        )*
    };
}

use {delegate};
