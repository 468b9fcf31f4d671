//! Localized reply texts backed by Fluent bundles.
//!
//! Two locales ship with the bot: Russian (the primary audience) and English.
//! Resources are embedded at compile time so replies never depend on the
//! working directory. Unsupported language codes fall back to Russian.

use fluent_bundle::concurrent::FluentBundle;
use fluent_bundle::{FluentArgs, FluentResource, FluentValue};
use log::warn;
use std::collections::HashMap;
use std::sync::{Arc, LazyLock};
use unic_langid::LanguageIdentifier;

/// Fallback language used when the user's language is not supported.
pub const FALLBACK_LANGUAGE: &str = "ru";

const LOCALE_RESOURCES: [(&str, &str); 2] = [
    ("ru", include_str!("../locales/ru/main.ftl")),
    ("en", include_str!("../locales/en/main.ftl")),
];

/// Localization manager holding one Fluent bundle per supported language.
pub struct LocalizationManager {
    bundles: HashMap<String, Arc<FluentBundle<FluentResource>>>,
}

impl LocalizationManager {
    /// Build the manager from the embedded locale resources.
    pub fn new() -> Self {
        let mut bundles = HashMap::new();

        for (lang, source) in LOCALE_RESOURCES {
            match Self::create_bundle(lang, source) {
                Ok(bundle) => {
                    bundles.insert(lang.to_string(), Arc::new(bundle));
                }
                Err(message) => warn!("Skipping locale {lang}: {message}"),
            }
        }

        Self { bundles }
    }

    fn create_bundle(lang: &str, source: &str) -> Result<FluentBundle<FluentResource>, String> {
        let locale: LanguageIdentifier = lang
            .parse()
            .map_err(|e| format!("invalid language identifier: {e:?}"))?;

        let mut bundle = FluentBundle::new_concurrent(vec![locale]);
        let resource = FluentResource::try_new(source.to_string())
            .map_err(|(_, errors)| format!("failed to parse fluent resource: {errors:?}"))?;
        bundle
            .add_resource(resource)
            .map_err(|errors| format!("failed to add fluent resource: {errors:?}"))?;

        Ok(bundle)
    }

    /// Whether a bundle exists for the given language.
    pub fn is_language_supported(&self, lang: &str) -> bool {
        self.bundles.contains_key(lang)
    }

    /// Resolve a message key in the given language, falling back to the
    /// default language and finally to the key itself.
    pub fn get_message_in_language(
        &self,
        key: &str,
        lang: &str,
        args: Option<&FluentArgs>,
    ) -> String {
        let bundle = self
            .bundles
            .get(lang)
            .or_else(|| self.bundles.get(FALLBACK_LANGUAGE));

        let bundle = match bundle {
            Some(bundle) => bundle,
            None => return key.to_string(),
        };

        let message = match bundle.get_message(key) {
            Some(message) => message,
            None => {
                warn!("Missing translation key: {key}");
                return key.to_string();
            }
        };

        let pattern = match message.value() {
            Some(pattern) => pattern,
            None => return key.to_string(),
        };

        let mut errors = vec![];
        bundle
            .format_pattern(pattern, args, &mut errors)
            .into_owned()
    }
}

impl Default for LocalizationManager {
    fn default() -> Self {
        Self::new()
    }
}

static MANAGER: LazyLock<LocalizationManager> = LazyLock::new(LocalizationManager::new);

/// Get the global localization manager.
pub fn manager() -> &'static LocalizationManager {
    &MANAGER
}

/// Map a Telegram language code (e.g. "ru", "en-US") to a supported language.
pub fn detect_language(language_code: Option<&str>) -> &'static str {
    let base = language_code
        .map(|code| code.split(['-', '_']).next().unwrap_or(code))
        .unwrap_or(FALLBACK_LANGUAGE);

    match base {
        "en" => "en",
        "ru" => "ru",
        _ => FALLBACK_LANGUAGE,
    }
}

/// Get a localized message for the user's language code.
pub fn t_lang(key: &str, language_code: Option<&str>) -> String {
    manager().get_message_in_language(key, detect_language(language_code), None)
}

/// Get a localized message with arguments for the user's language code.
pub fn t_args_lang(key: &str, args: &[(&str, &str)], language_code: Option<&str>) -> String {
    let fluent_args =
        FluentArgs::from_iter(args.iter().map(|(k, v)| (*k, FluentValue::from(*v))));
    manager().get_message_in_language(key, detect_language(language_code), Some(&fluent_args))
}
