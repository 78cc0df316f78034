use fluent::{FluentArgs, FluentResource};
use fluent_bundle::bundle::FluentBundle;
use include_dir::{Dir, include_dir};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{error, info, warn};
use unic_langid::LanguageIdentifier;

// The concurrent memoizer keeps bundles Send + Sync.
type ConcurrentBundle = FluentBundle<FluentResource, intl_memoizer::concurrent::IntlLangMemoizer>;

static LOCALES_DIR: Dir<'_> = include_dir!("$CARGO_MANIFEST_DIR/locales");

pub const FALLBACK_LOCALE: &str = "en-US";

pub struct LocalizationManager {
    bundles: HashMap<LanguageIdentifier, ConcurrentBundle>,
    fallback: LanguageIdentifier,
}

impl LocalizationManager {
    pub fn new() -> Self {
        let mut bundles = HashMap::new();

        for entry in LOCALES_DIR.dirs() {
            let locale_name = entry.path().to_string_lossy();
            let Ok(lang_id) = locale_name.parse::<LanguageIdentifier>() else {
                warn!("Skipping locale directory with invalid name: {}", locale_name);
                continue;
            };

            let mut bundle = ConcurrentBundle::new_concurrent(vec![lang_id.clone()]);
            // Replies embed mentions, which must reach Discord unwrapped.
            bundle.set_use_isolating(false);

            for file in entry.files() {
                if file.path().extension().and_then(|e| e.to_str()) != Some("ftl") {
                    continue;
                }
                let Some(content) = file.contents_utf8() else {
                    continue;
                };

                match FluentResource::try_new(content.to_string()) {
                    Ok(resource) => {
                        if let Err(errors) = bundle.add_resource(resource) {
                            for err in errors {
                                error!("Error adding resource for {}: {:?}", locale_name, err);
                            }
                        }
                    }
                    Err((_, errors)) => {
                        for err in errors {
                            error!("Error parsing resource for {}: {:?}", locale_name, err);
                        }
                    }
                }
            }

            info!("Loaded embedded locale: {}", locale_name);
            bundles.insert(lang_id, bundle);
        }

        Self {
            bundles,
            fallback: FALLBACK_LOCALE
                .parse()
                .unwrap_or_else(|_| LanguageIdentifier::default()),
        }
    }

    pub fn get_proxy(self: &Arc<Self>, locale: &str) -> L10nProxy {
        L10nProxy {
            manager: self.clone(),
            locale: locale.to_string(),
        }
    }

    fn format(&self, lang_id: &LanguageIdentifier, key: &str, args: Option<&FluentArgs>) -> Option<String> {
        let bundle = self.bundles.get(lang_id)?;
        let pattern = bundle.get_message(key)?.value()?;
        let mut errors = vec![];
        let text = bundle.format_pattern(pattern, args, &mut errors).into_owned();
        for err in errors {
            warn!("Error formatting {} for {}: {:?}", key, lang_id, err);
        }
        Some(text)
    }

    /// Translates `key` for `locale`, then for en-US, then gives the key back.
    pub fn translate(&self, locale: &str, key: &str, args: Option<&FluentArgs>) -> String {
        let lang_id = locale
            .parse::<LanguageIdentifier>()
            .unwrap_or_else(|_| self.fallback.clone());

        self.format(&lang_id, key, args)
            .or_else(|| {
                (lang_id != self.fallback)
                    .then(|| self.format(&self.fallback, key, args))
                    .flatten()
            })
            .unwrap_or_else(|| key.to_string())
    }

    /// Fills command and parameter descriptions from `command-<name>-description`
    /// and `command-<name>-<param>-description` messages.
    pub fn apply_translations<U, E>(&self, commands: &mut [poise::Command<U, E>]) {
        for lang_id in self.bundles.keys() {
            let locale = lang_id.to_string();
            let is_fallback = *lang_id == self.fallback;

            for cmd in commands.iter_mut() {
                let key = format!("command-{}-description", cmd.name);
                if let Some(desc) = self.format(lang_id, &key, None) {
                    if is_fallback {
                        cmd.description = Some(desc.clone());
                    }
                    cmd.description_localizations.insert(locale.clone(), desc);
                }

                for param in cmd.parameters.iter_mut() {
                    let key = format!("command-{}-{}-description", cmd.name, param.name);
                    if let Some(desc) = self.format(lang_id, &key, None) {
                        if is_fallback {
                            param.description = Some(desc.clone());
                        }
                        param.description_localizations.insert(locale.clone(), desc);
                    }
                }
            }
        }
    }
}

/// A translator bound to one locale.
pub struct L10nProxy {
    pub manager: Arc<LocalizationManager>,
    pub locale: String,
}

impl L10nProxy {
    pub fn t(&self, key: &str, args: Option<&FluentArgs>) -> String {
        self.manager.translate(&self.locale, key, args)
    }
}

/// Adds localization to the poise context.
pub trait ContextL10nExt {
    fn l10n_user(&self) -> L10nProxy;
}

impl ContextL10nExt for crate::Context<'_> {
    /// The interaction locale, else the guild's preferred locale, else en-US.
    fn l10n_user(&self) -> L10nProxy {
        let manager = &self.data().l10n;
        if let Some(locale) = self.locale() {
            return manager.get_proxy(locale);
        }
        let guild_locale = self.guild().map(|guild| guild.preferred_locale.clone());
        manager.get_proxy(guild_locale.as_deref().unwrap_or(FALLBACK_LOCALE))
    }
}
