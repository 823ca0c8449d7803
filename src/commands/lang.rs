//! `lang`: per-guild language preference and locale reload

use std::sync::Arc;

use tracing::warn;

use super::{Invocation, Reply, Services};

/// What `lang` was asked to do
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LangAction {
    Set(String),
    Show,
    Reload,
}

pub struct LangCommand {
    services: Arc<Services>,
}

impl LangCommand {
    pub fn new(services: Arc<Services>) -> Self {
        Self { services }
    }

    pub fn run(&self, inv: &Invocation, action: &LangAction) -> Reply {
        let s = &self.services;
        let text = match action {
            LangAction::Set(code) => self.set(inv, code.trim()),
            LangAction::Show => {
                let code = s.lang(inv);
                s.i18n.t_with("ui.lang_current", &code, &[("code", &code)])
            }
            LangAction::Reload => {
                let langs = s.i18n.reload();
                let langs = if langs.is_empty() {
                    "—".to_string()
                } else {
                    langs.join(", ")
                };
                s.i18n
                    .t_with("ui.lang_reloaded", &s.lang(inv), &[("langs", &langs)])
            }
        };
        Reply::text(text, s.default_ephemeral)
    }

    fn set(&self, inv: &Invocation, code: &str) -> String {
        let s = &self.services;
        let current = s.lang(inv);
        if !s.i18n.has_language(code) {
            let langs = s.i18n.available_languages().join(", ");
            return s.i18n.t_with(
                "ui.lang_unknown",
                &current,
                &[("code", &code), ("langs", &langs)],
            );
        }
        let Some(guild_id) = inv.guild_id.filter(|id| *id != 0) else {
            return s.t("ui.lang_no_guild", &current);
        };
        if let Err(err) = s.prefs.set(guild_id, code) {
            warn!(guild_id, error = %err, "failed to persist language preference");
            return format!("{}: {}", s.t("ui.err_no_data", &current), err);
        }
        s.i18n.t_with("ui.ok_lang_set", code, &[("code", &code)])
    }
}

#[cfg(test)]
mod tests {
    use super::super::testing::*;
    use super::*;

    #[test]
    fn test_set_then_show() {
        let h = harness(FakeUpstream::default());
        let cmd = LangCommand::new(h.services.clone());

        let reply = cmd.run(&USER, &LangAction::Set("uk".to_string()));
        assert_eq!(
            reply.embed.description,
            h.services.i18n.t_with("ui.ok_lang_set", "uk", &[("code", &"uk")])
        );
        assert_eq!(h.services.prefs.get(USER.guild_id), "uk");

        let reply = cmd.run(&USER, &LangAction::Show);
        assert!(reply.embed.description.ends_with("uk"));
    }

    #[test]
    fn test_unknown_language_is_rejected() {
        let h = harness(FakeUpstream::default());
        let cmd = LangCommand::new(h.services.clone());
        let reply = cmd.run(&USER, &LangAction::Set("fr".to_string()));
        assert_eq!(reply.embed.description, "Unknown language fr. Available: en, uk");
        assert_eq!(h.services.prefs.get(USER.guild_id), "en");
    }

    #[test]
    fn test_set_outside_guild() {
        let h = harness(FakeUpstream::default());
        let cmd = LangCommand::new(h.services.clone());
        let dm = Invocation {
            user_id: 1,
            guild_id: None,
        };
        let reply = cmd.run(&dm, &LangAction::Set("uk".to_string()));
        assert_eq!(reply.embed.description, "Language can only be set inside a server.");
    }

    #[test]
    fn test_reload_lists_languages() {
        let h = harness(FakeUpstream::default());
        let cmd = LangCommand::new(h.services.clone());
        let reply = cmd.run(&USER, &LangAction::Reload);
        assert_eq!(reply.embed.description, "Locales reloaded. Available: en, uk");
    }
}
