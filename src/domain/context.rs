use axum::http::HeaderMap;
use serde::Serialize;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AdCookies {
    #[serde(rename = "_fbc", skip_serializing_if = "Option::is_none")]
    pub fbc: Option<String>,
    #[serde(rename = "_fbp", skip_serializing_if = "Option::is_none")]
    pub fbp: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClientContext {
    pub client_ip: String,
    pub user_agent: String,
    pub cookies: AdCookies,
}

pub fn build_context(headers: &HeaderMap) -> ClientContext {
    let client_ip = header(headers, "x-forwarded-for")
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .or_else(|| header(headers, "x-real-ip"))
        .or_else(|| header(headers, "cf-connecting-ip"))
        .unwrap_or("127.0.0.1")
        .to_string();

    let user_agent = header(headers, "user-agent").unwrap_or_default().to_string();

    let cookies = header(headers, "cookie")
        .map(parse_ad_cookies)
        .unwrap_or_default();

    ClientContext {
        client_ip,
        user_agent,
        cookies,
    }
}

fn header<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|h| h.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

fn parse_ad_cookies(raw: &str) -> AdCookies {
    let mut cookies = AdCookies::default();
    for pair in raw.split(';') {
        let Some((name, value)) = pair.trim().split_once('=') else {
            continue;
        };
        match name {
            "_fbc" => cookies.fbc = Some(value.to_string()),
            "_fbp" => cookies.fbp = Some(value.to_string()),
            _ => {}
        }
    }
    cookies
}
