use serde::Serialize;
use url::{form_urlencoded, Url};

use crate::wizard::engine::WizardError;
use crate::wizard::request::QuoteRequest;

pub const DEFAULT_WHATSAPP_NUMBER: &str = "2348000000000";
const WHATSAPP_BASE: &str = "https://wa.me/";
const BRIEF_PREFERENCE: [&str; 3] = ["tech", "nature", "goal"];
const FALLBACK_BRIEF: &str = "New Project";

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct FastTrackMessage {
    pub greeting: String,
    pub text: String,
    pub link: String,
}

pub fn brief(request: &QuoteRequest) -> &str {
    BRIEF_PREFERENCE.iter().find_map(|key| request.specific(key)).unwrap_or(FALLBACK_BRIEF)
}

pub fn first_name(name: &str) -> &str {
    name.split_whitespace().next().unwrap_or("")
}

pub fn message_text(request: &QuoteRequest) -> String {
    let route = request.route.map(|route| route.as_str()).unwrap_or("GENERAL");
    format!(
        "Hi Jesprec! I just submitted a {route} project request ({}) for {}. \
         I'd like to fast-track my consultation!",
        brief(request),
        request.name
    )
}

/// Percent-encodes the way browsers do for `encodeURIComponent`: spaces become
/// `%20` and ``!'()*-._~`` stay literal.
pub fn encode_uri_component(text: &str) -> String {
    form_urlencoded::byte_serialize(text.as_bytes())
        .map(|chunk| match chunk {
            "+" => "%20",
            "%21" => "!",
            "%27" => "'",
            "%28" => "(",
            "%29" => ")",
            "%7E" => "~",
            other => other,
        })
        .collect()
}

pub fn compose(request: &QuoteRequest, whatsapp_number: &str) -> Result<FastTrackMessage, WizardError> {
    let text = message_text(request);
    let base = Url::parse(WHATSAPP_BASE)
        .and_then(|base| base.join(whatsapp_number))
        .map_err(|error| WizardError::InvalidMessageLink(error.to_string()))?;
    let link = format!("{base}?text={}", encode_uri_component(&text));

    Ok(FastTrackMessage {
        greeting: format!("Thank you, {}!", first_name(&request.name)),
        text,
        link,
    })
}
