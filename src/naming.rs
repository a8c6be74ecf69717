//! Graceful display-name heuristics
//!
//! Raw server port names ("Hydrogen:Track_1_Kick_L") are rewritten into
//! something a user wants to read on a canvas. A handful of well-known
//! clients get bespoke rules keyed on the group name; everything else
//! goes through a generic normalization.
//!
//! Every rule is a pure function from a short port name to a
//! [`GracefulName`], so each client's quirks stay isolated and testable.
//! Some rules defer a trailing "1" (or "0") digit: the digit is only
//! appended later, once a sibling port proves the client numbers its
//! ports, so a lone "out 1" shows as just "out".

/// Result of one graceful rewrite.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GracefulName {
    pub name: String,
    /// A digit to append later if a numbered sibling port shows up.
    pub deferred_digit: Option<char>,
}

impl GracefulName {
    fn plain(name: impl Into<String>) -> GracefulName {
        GracefulName {
            name: name.into(),
            deferred_digit: None,
        }
    }
}

/// Identity of a client with a bespoke naming rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientRule {
    FirewirePcm,
    A2j,
    Hydrogen,
    Ardour,
    Qtractor,
    SooperLooper,
    Luppp,
    Seq64,
    Seq192,
    CalfJackhost,
    RakarrackPlus,
    NonMixer,
    JackMixer,
}

/// Match order matters: first hit wins.
const KNOWN_CLIENTS: &[(&str, ClientRule)] = &[
    ("firewire_pcm", ClientRule::FirewirePcm),
    ("a2j", ClientRule::A2j),
    ("Hydrogen", ClientRule::Hydrogen),
    ("ardour", ClientRule::Ardour),
    ("Ardour", ClientRule::Ardour),
    ("Qtractor", ClientRule::Qtractor),
    ("SooperLooper", ClientRule::SooperLooper),
    ("sooperlooper", ClientRule::SooperLooper),
    ("Luppp", ClientRule::Luppp),
    ("seq64", ClientRule::Seq64),
    ("calfjackhost", ClientRule::CalfJackhost),
    ("rakarrack-plus", ClientRule::RakarrackPlus),
    ("seq192", ClientRule::Seq192),
    ("Non-Mixer", ClientRule::NonMixer),
    ("jack_mixer", ClientRule::JackMixer),
];

fn is_all_digits(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_digit())
}

/// Resolve a group name to a known client identity.
///
/// Accepted spellings, per client name C: `C`, `C.suffix`, `C/anything`,
/// `C_<digits>`, and the same with a trailing ` (whatever)` block.
pub fn pretty_client(group_name: &str) -> Option<ClientRule> {
    for &(client, rule) in KNOWN_CLIENTS {
        if group_name == client {
            return Some(rule);
        }
        if group_name
            .strip_prefix(client)
            .is_some_and(|rest| rest.starts_with('.'))
        {
            return Some(rule);
        }

        let name = group_name.split('/').next().unwrap_or(group_name);
        if name == client {
            return Some(rule);
        }
        if name
            .strip_prefix(client)
            .and_then(|rest| rest.strip_prefix('_'))
            .is_some_and(is_all_digits)
        {
            return Some(rule);
        }

        if name.contains(" (") && name.ends_with(')') {
            let head = name.split(" (").next().unwrap_or(name);
            if head == client {
                return Some(rule);
            }
            if head
                .strip_prefix(client)
                .and_then(|rest| rest.strip_prefix('_'))
                .is_some_and(is_all_digits)
            {
                return Some(rule);
            }
        }
    }

    None
}

/// Split trailing digits off a name. A redundant leading zero on the
/// number is dropped, with "0" and "09" as historical exceptions.
fn split_end_digits(name: &str) -> (&str, &str) {
    let digits = name.chars().rev().take_while(|c| c.is_ascii_digit()).count();
    let (base, num) = name.split_at(name.len() - digits);

    if num.starts_with('0') && num != "0" && num != "09" {
        (base, &num[1..])
    } else {
        (base, num)
    }
}

/// Cut `name` at the first occurrence of whichever suffix it ends with.
fn cut_end<'a>(name: &'a str, ends: &[&str]) -> &'a str {
    for end in ends {
        if name.ends_with(end) {
            return name.split(end).next().unwrap_or(name);
        }
    }
    name
}

/// Case-insensitive ASCII suffix test that keeps slicing safe.
fn ends_ci(s: &str, suffix: &str) -> bool {
    s.len() >= suffix.len()
        && s.is_char_boundary(s.len() - suffix.len())
        && s[s.len() - suffix.len()..].eq_ignore_ascii_case(suffix)
}

/// Numbered-suffix rewrite shared by several DAW-style clients: strip the
/// channel infix, defer a lone "1", append other numbers after a space.
fn numbered(name: &str, ends: &[&str]) -> GracefulName {
    let (base, num) = split_end_digits(name);
    if num.is_empty() {
        return GracefulName::plain(name);
    }

    let mut display = cut_end(base, ends).to_string();
    if num == "1" {
        GracefulName {
            name: display,
            deferred_digit: Some('1'),
        }
    } else {
        display.push(' ');
        display.push_str(num);
        GracefulName::plain(display)
    }
}

fn firewire_pcm(name: &str) -> GracefulName {
    if name.contains('(') && name.contains(')') {
        let after_para = name.split_once('(').map(|(_, rest)| rest).unwrap_or("");
        let inner = after_para.rsplit_once(')').map(|(head, _)| head).unwrap_or("");
        let (base, num) = split_end_digits(inner);
        if num.is_empty() {
            return GracefulName::plain(inner);
        }
        let base = base.strip_suffix(':').unwrap_or(base);
        GracefulName::plain(format!("{base} {num}"))
    } else {
        let after = name.split_once('_').map(|(_, rest)| rest).unwrap_or("");
        let cut = cut_end(after, &["_in", "_out"]).replace(':', " ");
        let (base, num) = split_end_digits(&cut);
        GracefulName::plain(format!("{base}{num}"))
    }
}

fn hydrogen(name: &str) -> GracefulName {
    let mut display = name.to_string();

    if let Some(rest) = name.strip_prefix("Track_") {
        display = rest.to_string();
        let (num, tail) = rest.split_once('_').unwrap_or((rest, ""));
        if is_all_digits(num) {
            display = format!("{num} {tail}");
        }
    }

    if display.ends_with("_Main_L") {
        display = display.replacen("_Main_L", " L", 1);
    } else if display.ends_with("_Main_R") {
        display = display.replacen("_Main_R", " R", 1);
    }

    GracefulName::plain(display)
}

fn a2j(name: &str) -> GracefulName {
    let (base, num) = split_end_digits(name);
    if num.is_empty() {
        return GracefulName::plain(name);
    }

    if base.ends_with(" MIDI ") {
        let mut display = cut_end(base, &[" MIDI "]).to_string();
        if num == "1" {
            return GracefulName {
                name: display,
                deferred_digit: Some('1'),
            };
        }
        display.push(' ');
        display.push_str(num);
        return GracefulName::plain(display);
    }

    if base.ends_with(" Port-") {
        let mut display = cut_end(base, &[" Port-"]).to_string();
        if num == "0" {
            return GracefulName {
                name: display,
                deferred_digit: Some('0'),
            };
        }
        display.push(' ');
        display.push_str(num);
        return GracefulName::plain(display);
    }

    GracefulName::plain(base)
}

fn ardour(name: &str) -> GracefulName {
    let mut display = name.to_string();

    if display.contains("/TriggerBox/") {
        display = format!("▸ {}", display.replacen("/TriggerBox/", "/", 1));
    }

    for pt in ["audio", "midi"] {
        if display == format!("physical_{pt}_input_monitor_enable") {
            return GracefulName::plain("physical monitor");
        }
    }

    numbered(
        &display,
        &["/audio_out ", "/audio_in ", "/midi_out ", "/midi_in "],
    )
}

fn jack_mixer(name: &str) -> GracefulName {
    if let Some((prefix, side)) = name.rsplit_once(" Out") {
        if side == " L" || side == " R" || side.is_empty() {
            return GracefulName::plain(format!("{prefix}{side}"));
        }
    }
    GracefulName::plain(name)
}

fn luppp(name: &str) -> GracefulName {
    let trimmed = name.strip_suffix('\n').unwrap_or(name);
    GracefulName::plain(trimmed.replace('_', " "))
}

fn calfjackhost(name: &str) -> GracefulName {
    let (base, num) = split_end_digits(name);
    if num.is_empty() {
        return GracefulName::plain(name);
    }
    GracefulName::plain(format!("{} {num}", cut_end(base, &[" Out #", " In #"])))
}

fn rakarrack_plus(name: &str) -> GracefulName {
    let mut display = name.to_string();
    if display.starts_with("rakarrack-plus ") {
        display = display.replacen("rakarrack-plus ", "", 1);
    }
    GracefulName::plain(display.replace('_', " "))
}

/// Normalization for clients without a bespoke rule.
pub fn generic(name: &str) -> GracefulName {
    let mut display = name.replace('_', " ");

    if ends_ci(&display, "-left") || ends_ci(&display, " left") {
        display = format!("{} L", &display[..display.len() - 5]);
    } else if ends_ci(&display, "-right") || ends_ci(&display, " right") {
        display = format!("{} R", &display[..display.len() - 6]);
    } else if display.eq_ignore_ascii_case("left in") {
        display = "In L".to_string();
    } else if display.eq_ignore_ascii_case("right in") {
        display = "In R".to_string();
    } else if display.eq_ignore_ascii_case("left out") {
        display = "Out L".to_string();
    } else if display.eq_ignore_ascii_case("right out") {
        display = "Out R".to_string();
    }

    if display.starts_with("Audio") {
        display = display.replace("Audio ", "");
    }

    GracefulName::plain(display)
}

/// Apply a known client's rule to a short port name.
pub fn apply(rule: ClientRule, name: &str) -> GracefulName {
    match rule {
        ClientRule::FirewirePcm => firewire_pcm(name),
        ClientRule::Hydrogen => hydrogen(name),
        ClientRule::A2j => a2j(name),
        ClientRule::Ardour => ardour(name),
        ClientRule::Qtractor => numbered(name, &["/in_", "/out_"]),
        ClientRule::NonMixer => numbered(name, &["/in-", "/out-"]),
        ClientRule::JackMixer => jack_mixer(name),
        ClientRule::SooperLooper => numbered(name, &["_in_", "_out_"]),
        ClientRule::Luppp => luppp(name),
        ClientRule::Seq64 => GracefulName::plain(name.replacen("seq64 midi ", "", 1)),
        ClientRule::Seq192 => GracefulName::plain(name.replacen("seq192 ", "", 1)),
        ClientRule::CalfJackhost => calfjackhost(name),
        ClientRule::RakarrackPlus => rakarrack_plus(name),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pretty_client_spellings() {
        assert_eq!(pretty_client("Hydrogen"), Some(ClientRule::Hydrogen));
        assert_eq!(pretty_client("Hydrogen.0"), Some(ClientRule::Hydrogen));
        assert_eq!(pretty_client("ardour/tracks"), Some(ClientRule::Ardour));
        assert_eq!(pretty_client("seq192_2"), Some(ClientRule::Seq192));
        assert_eq!(pretty_client("Qtractor (detached)"), Some(ClientRule::Qtractor));
        assert_eq!(pretty_client("Luppp_3 (live)"), Some(ClientRule::Luppp));
        assert_eq!(pretty_client("seq192_two"), None);
        assert_eq!(pretty_client("MyApp"), None);
    }

    #[test]
    fn test_split_end_digits() {
        assert_eq!(split_end_digits("out_12"), ("out_", "12"));
        assert_eq!(split_end_digits("out"), ("out", ""));
        assert_eq!(split_end_digits("ch 07"), ("ch ", "7"));
        assert_eq!(split_end_digits("ch 0"), ("ch ", "0"));
        assert_eq!(split_end_digits("ch 09"), ("ch ", "09"));
    }

    #[test]
    fn test_generic_stereo_suffixes() {
        assert_eq!(generic("master_Left").name, "master L");
        assert_eq!(generic("master-right").name, "master R");
        assert_eq!(generic("Left In").name, "In L");
        assert_eq!(generic("Audio Out right").name, "Out R");
        // every "Audio " occurrence goes, not just the first
        assert_eq!(generic("Audio Audio out").name, "out");
        assert_eq!(generic("plain_port").name, "plain port");
    }

    #[test]
    fn test_hydrogen_tracks() {
        assert_eq!(apply(ClientRule::Hydrogen, "Track_1_Kick").name, "1 Kick");
        assert_eq!(apply(ClientRule::Hydrogen, "Snare_Main_L").name, "Snare L");
        assert_eq!(apply(ClientRule::Hydrogen, "Snare_Main_R").name, "Snare R");
    }

    #[test]
    fn test_numbered_defers_one() {
        let first = apply(ClientRule::Qtractor, "Master/out_1");
        assert_eq!(first.name, "Master");
        assert_eq!(first.deferred_digit, Some('1'));

        let second = apply(ClientRule::Qtractor, "Master/out_2");
        assert_eq!(second.name, "Master 2");
        assert_eq!(second.deferred_digit, None);
    }

    #[test]
    fn test_a2j_port_names() {
        let first = apply(ClientRule::A2j, "Launchpad MIDI 1");
        assert_eq!(first.name, "Launchpad");
        assert_eq!(first.deferred_digit, Some('1'));

        let second = apply(ClientRule::A2j, "Launchpad MIDI 2");
        assert_eq!(second.name, "Launchpad 2");

        let zero = apply(ClientRule::A2j, "nanoKEY Port-0");
        assert_eq!(zero.name, "nanoKEY");
        assert_eq!(zero.deferred_digit, Some('0'));
    }

    #[test]
    fn test_firewire_names() {
        // the base keeps its trailing space before the number is re-appended
        assert_eq!(
            apply(ClientRule::FirewirePcm, "dev_a (Analog Out 1)").name,
            "Analog Out  1"
        );
        assert_eq!(
            apply(ClientRule::FirewirePcm, "dev_a (ADAT:3)").name,
            "ADAT 3"
        );
        assert_eq!(
            apply(ClientRule::FirewirePcm, "saffire_Mix:L_out").name,
            "Mix L"
        );
    }

    #[test]
    fn test_jack_mixer_out_sides() {
        assert_eq!(apply(ClientRule::JackMixer, "Drums Out L").name, "Drums L");
        assert_eq!(apply(ClientRule::JackMixer, "Drums Out").name, "Drums");
        assert_eq!(apply(ClientRule::JackMixer, "Drums Output").name, "Drums Output");
    }

    #[test]
    fn test_ardour_monitor_and_triggerbox() {
        assert_eq!(
            apply(ClientRule::Ardour, "physical_audio_input_monitor_enable").name,
            "physical monitor"
        );
        let trig = apply(ClientRule::Ardour, "Bass/TriggerBox/audio_out 1");
        assert_eq!(trig.name, "▸ Bass");
        assert_eq!(trig.deferred_digit, Some('1'));
    }
}
