#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ThemeMode {
    Light,
    Dark,
}

pub struct ThemeDefinition {
    pub css: &'static str,
}

pub fn theme_definition(mode: ThemeMode) -> ThemeDefinition {
    match mode {
        ThemeMode::Light => ThemeDefinition { css: LIGHT_THEME },
        ThemeMode::Dark => ThemeDefinition { css: DARK_THEME },
    }
}

const LIGHT_THEME: &str = r#"
:root {
    --color-bg-primary: #ffffff;
    --color-bg-secondary: #f5f6f8;
    --color-text-primary: #14181f;
    --color-text-muted: #5a6472;
    --color-border: #d7dce3;
    --color-surface-muted: #eef1f4;
    --color-input-border: #c2c9d2;
    --color-input-bg: #ffffff;
    --color-chat-user-bg: #1f6feb;
    --color-chat-user-text: #ffffff;
    --color-chat-assistant-bg: #f2f4f7;
    --color-chat-assistant-text: #14181f;
    --color-accent: #1f6feb;
    --color-danger: #c0392b;
    --color-timestamp: #8a93a0;
}
body { background: var(--color-bg-primary); color: var(--color-text-primary); }
.header { background: var(--color-bg-primary); border-bottom: 1px solid var(--color-border); }
.btn:hover,
.btn-ghost:hover { background: var(--color-surface-muted); }
.composer textarea { background: var(--color-input-bg); color: var(--color-text-primary); border-color: var(--color-input-border); }
.composer textarea:focus { border-color: var(--color-accent); }
"#;

const DARK_THEME: &str = r#"
:root {
    --color-bg-primary: #10141a;
    --color-bg-secondary: #161b23;
    --color-text-primary: #e8ecf1;
    --color-text-muted: #9aa4b1;
    --color-border: #2a313c;
    --color-surface-muted: #1d242e;
    --color-input-border: #323a46;
    --color-input-bg: #10141a;
    --color-chat-user-bg: #2b6cd4;
    --color-chat-user-text: #ffffff;
    --color-chat-assistant-bg: #1a202a;
    --color-chat-assistant-text: #e8ecf1;
    --color-accent: #4c8dff;
    --color-danger: #e57363;
    --color-timestamp: #6f7a88;
}
body { background: var(--color-bg-primary); color: var(--color-text-primary); }
.header { background: var(--color-bg-primary); border-bottom: 1px solid var(--color-border); }
.btn:hover,
.btn-ghost:hover { background: var(--color-surface-muted); }
.composer textarea { background: var(--color-input-bg); color: var(--color-text-primary); border-color: var(--color-input-border); }
.composer textarea:focus { border-color: var(--color-accent); }
"#;
