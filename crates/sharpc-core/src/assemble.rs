//! Composing the user fragment into a complete program source.
//!
//! The skeleton is fixed: a WPF `Application` subclass with an entry
//! point, a minimal bootstrap window, and -- when an embedded markup
//! payload is present -- decode-and-apply logic that parses the payload
//! into the real window at startup. The user fragment is inserted
//! verbatim, indented into the generated class scope.

/// Indentation applied to the user fragment: two levels inside
/// `namespace { class { ... } }`.
const FRAGMENT_LEVELS: usize = 2;

/// Width of one indentation level in the generated source.
const INDENT_WIDTH: usize = 4;

/// Opening of the skeleton: using directives, assembly attributes, and the
/// application entry point.
const HEADER: &str = r#"using System;
using System.Collections.Generic;
using System.Linq;
using System.Text;
using System.Threading.Tasks;
using System.Reflection;
using System.Windows;
using System.Windows.Markup;
using Sharpc.Extension.Abstracts;

[assembly: AssemblyTitle("Title")]
[assembly: AssemblyProduct("Product")]
[assembly: AssemblyCompany("Company")]
[assembly: AssemblyCopyright("Copyright")]
[assembly: AssemblyTrademark("Trademark")]
[assembly: AssemblyVersion("1.0.0.0")]
[assembly: AssemblyFileVersion("1.0.0.0")]

namespace Sharpc.Default
{
    public partial class App : Application
    {
        [STAThread]
        public static void Main()
        {
            App app = new App();
            app.InitializeComponent();
            app.Run();
        }

"#;

/// Helpers emitted only when an embedded markup payload is present.
const MARKUP_HELPERS: &str = r#"        public string Decode(string value)
        {
            if (value != null && value.Length > 0)
            {
                return Encoding.UTF8.GetString(Convert.FromBase64String(value));
            }
            else
            {
                return string.Empty;
            }
        }

        public SharpcView FindControl(DependencyObject parent, string value)
        {
            return LogicalTreeHelper.FindLogicalNode(parent, value) as SharpcView;
        }

"#;

/// Bootstrap window used when no markup payload is embedded: invisible,
/// borderless, absent from the taskbar.
const BOOTSTRAP_WINDOW: &str = r#"            Window window = new Window();
            window.Opacity = 0;
            window.WindowStyle = WindowStyle.None;
            window.AllowsTransparency = true;
            window.ShowInTaskbar = false;
"#;

/// Event wiring and close of `InitializeComponent`.
const WINDOW_WIRING: &str = r#"            window.Loaded += (s, e) => Initialize();
            window.Closing += (s, e) =>
            {
                if (Closing != null) Closing();
            };
            window.Show();
        }

"#;

/// Indent every non-empty line of `source` by `levels` levels.
pub fn indent(source: &str, levels: usize) -> String {
    let pad = " ".repeat(levels * INDENT_WIDTH);
    let mut out = String::with_capacity(source.len() + pad.len() * 8);
    for line in source.lines() {
        if !line.is_empty() {
            out.push_str(&pad);
            out.push_str(line);
        }
        out.push('\n');
    }
    out
}

/// Compose the full program source from the user fragment and the
/// (already encoded) embedded markup payload.
///
/// The fragment is preserved verbatim; an empty markup payload selects the
/// invisible bootstrap window instead of the decode-and-apply block.
pub fn assemble(fragment: &str, encoded_markup: &str) -> String {
    let mut src = String::with_capacity(2048 + fragment.len() + encoded_markup.len());

    src.push_str(HEADER);

    if !encoded_markup.is_empty() {
        src.push_str(MARKUP_HELPERS);
    }

    src.push_str("        public void InitializeComponent()\n        {\n");

    if encoded_markup.is_empty() {
        src.push_str(BOOTSTRAP_WINDOW);
    } else {
        src.push_str(&format!(
            "            Window window = (XamlReader.Parse(Decode(\"{encoded_markup}\")) as Window);\n"
        ));
    }

    src.push_str(WINDOW_WIRING);
    src.push_str(&indent(fragment, FRAGMENT_LEVELS));
    src.push_str("    }\n}\n");

    src
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn indent_pads_non_empty_lines_only() {
        assert_eq!(indent("a\n\nb\n", 1), "    a\n\n    b\n");
    }

    #[test]
    fn fragment_is_preserved_verbatim_and_indented() {
        let fragment = "public void Initialize()\n{\n}";
        let src = assemble(fragment, "");
        assert!(src.contains("        public void Initialize()\n        {\n        }\n"));
    }

    #[test]
    fn empty_markup_generates_invisible_bootstrap() {
        let src = assemble("", "");
        assert!(src.contains("window.Opacity = 0;"));
        assert!(!src.contains("XamlReader.Parse"));
        assert!(!src.contains("public string Decode"));
    }

    #[test]
    fn markup_payload_is_embedded_with_decode_helpers() {
        let encoded = crate::encode::encode_markup("<Window/>");
        let src = assemble("", &encoded);
        assert!(src.contains(&format!("XamlReader.Parse(Decode(\"{encoded}\"))")));
        assert!(src.contains("public string Decode"));
        assert!(src.contains("FindControl"));
    }

    #[test]
    fn skeleton_has_entry_point_and_closing_braces() {
        let src = assemble("", "");
        assert!(src.contains("public static void Main()"));
        assert!(src.ends_with("    }\n}\n"));
    }
}
