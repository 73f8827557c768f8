//! 内置 Kokoro 音色与语言目录
//!
//! 音色编码前两位表示语言与性别，例如 `ff` = 法语女声

/// 支持的 Kokoro 音色
pub const VOICES: &[&str] = &[
    "af_alloy", "af_aoede", "af_bella", "af_heart", "af_jessica", "af_kore", "af_nicole",
    "af_nova", "af_river", "af_sarah", "af_sky", "am_adam", "am_echo", "am_eric",
    "am_fenrir", "am_liam", "am_michael", "am_onyx", "am_puck", "bf_alice",
    "bf_emma", "bf_isabella", "bf_lily", "bm_daniel", "bm_fable", "bm_george", "bm_lewis",
    "ff_siwis", "if_sara", "im_nicola", "jf_alpha", "jf_gongitsune", "jf_nezumi",
    "jf_tebukuro", "jm_kumo", "zf_xiaobei", "zf_xiaoni", "zf_xiaoxiao", "zf_xiaoyi",
];

/// 支持的语言标签及显示名称
pub const LOCALES: &[(&str, &str)] = &[
    ("fr-fr", "Français"),
    ("it", "Italiano"),
    ("en-us", "English (US)"),
    ("en-gb", "English (GB)"),
    ("ja", "日本語"),
    ("cmn", "中文"),
    ("pt-br", "Português (BR)"),
    ("es", "Español"),
];

/// 语言标签的显示名称
pub fn locale_name(tag: &str) -> Option<&'static str> {
    LOCALES
        .iter()
        .find(|(code, _)| *code == tag)
        .map(|(_, name)| *name)
}

/// 音色对应的默认语言标签
pub fn voice_language(voice: &str) -> Option<&'static str> {
    let prefix = voice.get(..1)?;
    match prefix {
        "a" => Some("en-us"),
        "b" => Some("en-gb"),
        "f" => Some("fr-fr"),
        "i" => Some("it"),
        "j" => Some("ja"),
        "z" => Some("cmn"),
        "p" => Some("pt-br"),
        "e" => Some("es"),
        _ => None,
    }
}
