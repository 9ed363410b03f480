//! # Localization Module
//!
//! User-facing messages rendered from Fluent resources. The English resource
//! is compiled into the binary so messages work from any working directory.

use std::collections::HashMap;

use anyhow::{anyhow, Context, Result};
use fluent_bundle::{FluentArgs, FluentBundle, FluentResource, FluentValue};
use log::warn;
use unic_langid::LanguageIdentifier;

use crate::errors::{ExtractionError, ImportError};
use crate::recipes::RecipeNameError;

pub const DEFAULT_LANGUAGE: &str = "en";

const EN_RESOURCE: &str = include_str!("../locales/en/main.ftl");

/// Localized message lookup
pub struct LocalizationManager {
    bundles: HashMap<String, FluentBundle<FluentResource>>,
}

impl LocalizationManager {
    /// Create a manager with all bundled languages
    pub fn new() -> Result<Self> {
        let mut bundles = HashMap::new();
        bundles.insert(
            DEFAULT_LANGUAGE.to_string(),
            Self::create_bundle(DEFAULT_LANGUAGE, EN_RESOURCE)?,
        );
        Ok(Self { bundles })
    }

    fn create_bundle(language: &str, source: &str) -> Result<FluentBundle<FluentResource>> {
        let locale: LanguageIdentifier = language
            .parse()
            .with_context(|| format!("Invalid language identifier '{language}'"))?;
        let resource = FluentResource::try_new(source.to_string())
            .map_err(|(_, errors)| anyhow!("Invalid Fluent resource for '{language}': {errors:?}"))?;

        let mut bundle = FluentBundle::new(vec![locale]);
        // Plain terminal output, no bidi isolation marks around arguments
        bundle.set_use_isolating(false);
        bundle
            .add_resource(resource)
            .map_err(|errors| anyhow!("Duplicate Fluent messages for '{language}': {errors:?}"))?;
        Ok(bundle)
    }

    /// Get a localized message, falling back to English for unknown languages
    pub fn get_message_in_language(
        &self,
        key: &str,
        language: &str,
        args: Option<&HashMap<&str, &str>>,
    ) -> String {
        let Some(bundle) = self
            .bundles
            .get(language)
            .or_else(|| self.bundles.get(DEFAULT_LANGUAGE))
        else {
            return format!("Missing translation: {key}");
        };

        let Some(pattern) = bundle.get_message(key).and_then(|msg| msg.value()) else {
            return format!("Missing translation: {key}");
        };

        let fluent_args = args.map(|args| {
            let mut fluent_args = FluentArgs::new();
            for (name, value) in args {
                fluent_args.set(*name, FluentValue::from(*value));
            }
            fluent_args
        });

        let mut errors = Vec::new();
        let value = bundle.format_pattern(pattern, fluent_args.as_ref(), &mut errors);
        if !errors.is_empty() {
            warn!("Formatting '{}' reported errors: {:?}", key, errors);
        }
        value.into_owned()
    }

    /// Get a message in the default language
    pub fn get_message(&self, key: &str, args: Option<&HashMap<&str, &str>>) -> String {
        self.get_message_in_language(key, DEFAULT_LANGUAGE, args)
    }

    /// Get a message with simple string arguments
    pub fn get_message_with_args(&self, key: &str, args: &[(&str, &str)]) -> String {
        let args: HashMap<&str, &str> = args.iter().copied().collect();
        self.get_message(key, Some(&args))
    }

    /// Message shown when an import leaves the table unchanged
    pub fn import_error_message(&self, err: &ImportError) -> String {
        match err {
            ImportError::EmptyText => self.get_message("import-empty-text", None),
            ImportError::EmptyResult => self.get_message("import-empty-result", None),
            ImportError::Extraction(ExtractionError::MissingApiKey) => {
                self.get_message("import-missing-api-key", None)
            }
            ImportError::Extraction(inner) => {
                let reason = inner.to_string();
                self.get_message_with_args("import-failed", &[("reason", reason.as_str())])
            }
        }
    }

    pub fn recipe_name_error_message(&self, err: &RecipeNameError) -> String {
        match err {
            RecipeNameError::Empty => self.get_message("recipe-name-invalid", None),
            RecipeNameError::TooLong => self.get_message("recipe-name-too-long", None),
        }
    }
}
