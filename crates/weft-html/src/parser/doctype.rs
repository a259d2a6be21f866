//! [§ 13.2.6.4.1 The "initial" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#the-initial-insertion-mode)
//!
//! DOCTYPE conformance and the quirks mode decision.

use weft_dom::QuirksMode;

/// "The public identifier starts with: ..." (full quirks).
const QUIRKY_PUBLIC_PREFIXES: &[&str] = &[
    "+//silmaril//dtd html pro v0r11 19970101//",
    "-//as//dtd html 3.0 aswedit + extensions//",
    "-//advasoft ltd//dtd html 3.0 aswedit + extensions//",
    "-//ietf//dtd html 2.0 level 1//",
    "-//ietf//dtd html 2.0 level 2//",
    "-//ietf//dtd html 2.0 strict level 1//",
    "-//ietf//dtd html 2.0 strict level 2//",
    "-//ietf//dtd html 2.0 strict//",
    "-//ietf//dtd html 2.0//",
    "-//ietf//dtd html 2.1e//",
    "-//ietf//dtd html 3.0//",
    "-//ietf//dtd html 3.2 final//",
    "-//ietf//dtd html 3.2//",
    "-//ietf//dtd html 3//",
    "-//ietf//dtd html level 0//",
    "-//ietf//dtd html level 1//",
    "-//ietf//dtd html level 2//",
    "-//ietf//dtd html level 3//",
    "-//ietf//dtd html strict level 0//",
    "-//ietf//dtd html strict level 1//",
    "-//ietf//dtd html strict level 2//",
    "-//ietf//dtd html strict level 3//",
    "-//ietf//dtd html strict//",
    "-//ietf//dtd html//",
    "-//metrius//dtd metrius presentational//",
    "-//microsoft//dtd internet explorer 2.0 html strict//",
    "-//microsoft//dtd internet explorer 2.0 html//",
    "-//microsoft//dtd internet explorer 2.0 tables//",
    "-//microsoft//dtd internet explorer 3.0 html strict//",
    "-//microsoft//dtd internet explorer 3.0 html//",
    "-//microsoft//dtd internet explorer 3.0 tables//",
    "-//netscape comm. corp.//dtd html//",
    "-//netscape comm. corp.//dtd strict html//",
    "-//o'reilly and associates//dtd html 2.0//",
    "-//o'reilly and associates//dtd html extended 1.0//",
    "-//o'reilly and associates//dtd html extended relaxed 1.0//",
    "-//sq//dtd html 2.0 hotmetal + extensions//",
    "-//softquad software//dtd hotmetal pro 6.0::19990601::extensions to html 4.0//",
    "-//softquad//dtd hotmetal pro 4.0::19971010::extensions to html 4.0//",
    "-//spyglass//dtd html 2.0 extended//",
    "-//sun microsystems corp.//dtd hotjava html//",
    "-//sun microsystems corp.//dtd hotjava strict html//",
    "-//w3c//dtd html 3 1995-03-24//",
    "-//w3c//dtd html 3.2 draft//",
    "-//w3c//dtd html 3.2 final//",
    "-//w3c//dtd html 3.2//",
    "-//w3c//dtd html 3.2s draft//",
    "-//w3c//dtd html 4.0 frameset//",
    "-//w3c//dtd html 4.0 transitional//",
    "-//w3c//dtd html experimental 19960712//",
    "-//w3c//dtd html experimental 970421//",
    "-//w3c//dtd w3 html//",
    "-//w3o//dtd w3 html 3.0//",
    "-//webtechs//dtd mozilla html 2.0//",
    "-//webtechs//dtd mozilla html//",
];

/// "The public identifier is set to: ..." (full quirks).
const QUIRKY_PUBLIC_IDS: &[&str] = &["-//w3o//dtd w3 html strict 3.0//en//", "-/w3c/dtd html 4.0 transitional/en", "html"];

/// HTML 4.01 public identifiers: quirks without a system identifier, limited
/// quirks with one.
const HTML401_PUBLIC_PREFIXES: &[&str] = &["-//w3c//dtd html 4.01 frameset//", "-//w3c//dtd html 4.01 transitional//"];

/// "The public identifier starts with: ..." (limited quirks).
const LIMITED_QUIRKY_PUBLIC_PREFIXES: &[&str] =
    &["-//w3c//dtd xhtml 1.0 frameset//", "-//w3c//dtd xhtml 1.0 transitional//"];

fn starts_with_any(id: &str, prefixes: &[&str]) -> bool {
    prefixes.iter().any(|prefix| id.starts_with(prefix))
}

/// "If the DOCTYPE token's name is not "html", or the token's public
/// identifier is not missing, or the token's system identifier is neither
/// missing nor "about:legacy-compat", then there is a parse error."
#[must_use]
pub fn is_conforming(name: Option<&str>, public_id: Option<&str>, system_id: Option<&str>) -> bool {
    name == Some("html") && public_id.is_none() && system_id.is_none_or(|id| id == "about:legacy-compat")
}

/// The quirks mode a DOCTYPE token puts the document in.
///
/// Public and system identifiers are compared ASCII case-insensitively.
#[must_use]
pub fn quirks_mode_for(
    name: Option<&str>,
    public_id: Option<&str>,
    system_id: Option<&str>,
    force_quirks: bool,
) -> QuirksMode {
    let public = public_id.map(str::to_ascii_lowercase);
    let system = system_id.map(str::to_ascii_lowercase);
    let public = public.as_deref();
    let system = system.as_deref();

    // "Then, if the document is not an iframe srcdoc document, and the parser
    // cannot change the mode flag is false, and the DOCTYPE token matches one
    // of the conditions in the following list, then set the Document to
    // quirks mode:"
    let quirks = force_quirks
        || name != Some("html")
        || public.is_some_and(|id| QUIRKY_PUBLIC_IDS.contains(&id) || starts_with_any(id, QUIRKY_PUBLIC_PREFIXES))
        || system == Some("http://www.ibm.com/data/dtd/v11/ibmxhtml1-transitional.dtd")
        || (system.is_none() && public.is_some_and(|id| starts_with_any(id, HTML401_PUBLIC_PREFIXES)));
    if quirks {
        return QuirksMode::Quirks;
    }

    // "Otherwise, if the document is not an iframe srcdoc document, and the
    // parser cannot change the mode flag is false, and the DOCTYPE token
    // matches one of the conditions in the following list, then then set the
    // Document to limited-quirks mode:"
    let limited = public.is_some_and(|id| {
        starts_with_any(id, LIMITED_QUIRKY_PUBLIC_PREFIXES)
            || (system.is_some() && starts_with_any(id, HTML401_PUBLIC_PREFIXES))
    });
    if limited {
        QuirksMode::LimitedQuirks
    } else {
        QuirksMode::NoQuirks
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_html5_doctype_is_no_quirks() {
        assert_eq!(quirks_mode_for(Some("html"), None, None, false), QuirksMode::NoQuirks);
        assert!(is_conforming(Some("html"), None, None));
        assert!(is_conforming(Some("html"), None, Some("about:legacy-compat")));
    }

    #[test]
    fn test_html401_frameset_depends_on_system_id() {
        let public = Some("-//W3C//DTD HTML 4.01 Frameset//EN");
        assert_eq!(quirks_mode_for(Some("html"), public, None, false), QuirksMode::Quirks);
        assert_eq!(
            quirks_mode_for(Some("html"), public, Some("http://www.w3.org/TR/html4/frameset.dtd"), false),
            QuirksMode::LimitedQuirks
        );
        assert!(!is_conforming(Some("html"), public, None));
    }

    #[test]
    fn test_xhtml_transitional_is_limited_quirks() {
        let public = Some("-//W3C//DTD XHTML 1.0 Transitional//EN");
        assert_eq!(quirks_mode_for(Some("html"), public, None, false), QuirksMode::LimitedQuirks);
    }

    #[test]
    fn test_force_quirks_and_wrong_name() {
        assert_eq!(quirks_mode_for(Some("html"), None, None, true), QuirksMode::Quirks);
        assert_eq!(quirks_mode_for(Some("svg"), None, None, false), QuirksMode::Quirks);
        assert_eq!(quirks_mode_for(None, None, None, false), QuirksMode::Quirks);
        assert_eq!(quirks_mode_for(Some("html"), Some("HTML"), None, false), QuirksMode::Quirks);
    }
}
