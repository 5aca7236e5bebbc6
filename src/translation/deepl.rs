use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, warn};

use super::Translator;
use crate::config::Config;
use crate::error::TranslateError;
use crate::types::caption_data::{Direction, TranslationRequest};

#[derive(Deserialize, Debug)]
struct DeepLResponse {
    translations: Vec<DeepLTranslation>,
}

#[derive(Deserialize, Debug)]
struct DeepLTranslation {
    text: String,
}

/// DeepL v2 `/translate` over a form POST.
pub struct DeepLTranslator {
    client: Client,
    api_url: String,
    api_key: Option<String>,
    auto_source: bool,
    source_lang: String,
    target_lang: String,
}

impl DeepLTranslator {
    pub fn new(config: &Config) -> Result<Self, TranslateError> {
        let client = Client::builder()
            .user_agent(concat!("clicktrans/", env!("CARGO_PKG_VERSION")))
            .timeout(config.request_timeout())
            .build()?;
        Ok(Self {
            client,
            api_url: config.api_url.clone(),
            api_key: config.deepl_api_key.clone().filter(|k| !k.trim().is_empty()),
            auto_source: config.source_is_auto(),
            source_lang: config.source_lang.clone(),
            target_lang: config.target_lang.clone(),
        })
    }

    /// `(source, target)`; a `None` source lets DeepL detect it.
    pub fn language_pair(&self, direction: Direction) -> Result<(Option<&str>, &str), TranslateError> {
        let auto = self.auto_source;
        match direction {
            Direction::Forward if auto => Ok((None, self.target_lang.as_str())),
            Direction::Forward => Ok((Some(self.source_lang.as_str()), self.target_lang.as_str())),
            Direction::Reverse if auto => Err(TranslateError::NoReverseTarget),
            Direction::Reverse => Ok((Some(self.target_lang.as_str()), self.source_lang.as_str())),
        }
    }

    pub fn form_params(&self, request: &TranslationRequest) -> Result<Vec<(&'static str, String)>, TranslateError> {
        let (source, target) = self.language_pair(request.direction)?;
        let mut params = vec![("text", request.text.clone())];
        if let Some(source) = source {
            params.push(("source_lang", source.to_string()));
        }
        params.push(("target_lang", target.to_string()));
        Ok(params)
    }
}

/// Takes the first translation; anything else is an unusable payload.
pub fn parse_response(body: serde_json::Value) -> Result<String, TranslateError> {
    let parsed: DeepLResponse = serde_json::from_value(body).map_err(|e| {
        debug!("unexpected DeepL payload: {}", e);
        TranslateError::UnexpectedPayload
    })?;
    parsed
        .translations
        .into_iter()
        .next()
        .map(|t| t.text)
        .filter(|t| !t.trim().is_empty())
        .ok_or(TranslateError::EmptyResult)
}

#[async_trait]
impl Translator for DeepLTranslator {
    async fn translate(&self, request: &TranslationRequest) -> Result<String, TranslateError> {
        let api_key = self.api_key.as_deref().ok_or(TranslateError::MissingApiKey)?;
        let params = self.form_params(request)?;
        debug!("translating '{}' ({:?}, {})", request.text, request.direction, request.generation);

        let response = self
            .client
            .post(&self.api_url)
            .header("Authorization", format!("DeepL-Auth-Key {}", api_key))
            .form(&params)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            warn!("DeepL answered HTTP {}", status);
            return Err(TranslateError::Status(status.as_u16()));
        }
        let body: serde_json::Value = response.json().await?;
        parse_response(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::caption_data::Generation;
    use serde_json::json;

    fn translator(source: &str, key: Option<&str>) -> DeepLTranslator {
        let config = Config {
            source_lang: source.to_string(),
            deepl_api_key: key.map(String::from),
            ..Config::default()
        };
        DeepLTranslator::new(&config).unwrap()
    }

    fn request(text: &str, direction: Direction) -> TranslationRequest {
        TranslationRequest { text: text.to_string(), direction, generation: Generation(1) }
    }

    #[test]
    fn forward_and_reverse_swap_the_pair() {
        let t = translator("SV", Some("k"));
        let forward = t.form_params(&request("mår", Direction::Forward)).unwrap();
        assert!(forward.contains(&("source_lang", "SV".to_string())));
        assert!(forward.contains(&("target_lang", "EN".to_string())));

        let reverse = t.form_params(&request("feel", Direction::Reverse)).unwrap();
        assert!(reverse.contains(&("source_lang", "EN".to_string())));
        assert!(reverse.contains(&("target_lang", "SV".to_string())));
    }

    #[test]
    fn auto_source_is_omitted_and_has_no_reverse() {
        let t = translator("Auto", Some("k"));
        let params = t.form_params(&request("hej", Direction::Forward)).unwrap();
        assert!(params.iter().all(|(k, _)| *k != "source_lang"));
        assert!(matches!(
            t.form_params(&request("hi", Direction::Reverse)),
            Err(TranslateError::NoReverseTarget)
        ));
    }

    #[test]
    fn parses_first_translation() {
        let body = json!({ "translations": [{ "text": "feel" }, { "text": "other" }] });
        assert_eq!(parse_response(body).unwrap(), "feel");
    }

    #[test]
    fn odd_payloads_are_errors() {
        assert!(matches!(parse_response(json!({ "translations": [] })), Err(TranslateError::EmptyResult)));
        assert!(matches!(parse_response(json!({ "message": "quota" })), Err(TranslateError::UnexpectedPayload)));
        assert!(matches!(parse_response(json!([1, 2])), Err(TranslateError::UnexpectedPayload)));
    }

    #[tokio::test]
    async fn missing_key_fails_before_any_request() {
        let t = translator("SV", None);
        let err = t.translate(&request("hej", Direction::Forward)).await.unwrap_err();
        assert!(matches!(err, TranslateError::MissingApiKey));
    }
}
