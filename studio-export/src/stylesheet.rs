//! Bundle stylesheet: animations, base reset, container, then user CSS.

use studio_core::CanvasConfig;

/// Keyframes and classes for element animations and carousel slides.
pub const GLOBAL_ANIMATIONS: &str = r"@keyframes shake {
  0%, 100% { transform: translateX(0); }
  10%, 30%, 50%, 70%, 90% { transform: translateX(-5px); }
  20%, 40%, 60%, 80% { transform: translateX(5px); }
}
.custom-shake {
  animation: shake var(--anim-duration, 0.5s) cubic-bezier(.36,.07,.19,.97) both;
}

@keyframes fadeIn {
  from { opacity: 0; }
  to { opacity: 1; }
}
.custom-fade-in {
  animation: fadeIn var(--anim-duration, 1s) ease-out forwards;
}

@keyframes slideUp {
  from { transform: translateY(20px); opacity: 0; }
  to { transform: translateY(0); opacity: 1; }
}
.custom-slide-up {
  animation: slideUp var(--anim-duration, 0.5s) ease-out forwards;
}

@keyframes pulseScale {
  0% { transform: scale(1); }
  50% { transform: scale(var(--anim-scale, 1.05)); }
  100% { transform: scale(1); }
}
.custom-pulse {
  animation: pulseScale var(--anim-duration, 2s) ease-in-out;
}

@keyframes spin {
  to { transform: rotate(360deg); }
}
.animate-spin {
  animation: spin var(--anim-duration, 1s) linear;
}

@keyframes ping {
  75%, 100% { transform: scale(2); opacity: 0; }
}
.animate-ping {
  animation: ping var(--anim-duration, 1s) cubic-bezier(0, 0, 0.2, 1);
}

@keyframes bounce {
  0%, 100% { transform: translateY(-25%); animation-timing-function: cubic-bezier(0.8, 0, 1, 1); }
  50% { transform: none; animation-timing-function: cubic-bezier(0, 0, 0.2, 1); }
}
.animate-bounce {
  animation: bounce var(--anim-duration, 1s);
}

.infinite {
  animation-iteration-count: infinite;
}

@keyframes slideInRight {
  from { transform: translateX(100%); opacity: 0; }
  to { transform: translateX(0); opacity: 1; }
}
.slide-in-right {
  animation: slideInRight 0.5s ease-out forwards;
}

@keyframes slideOutLeft {
  from { transform: translateX(0); opacity: 1; }
  to { transform: translateX(-100%); opacity: 0; }
}
.slide-out-left {
  animation: slideOutLeft 0.5s ease-out forwards;
}

@keyframes slideInLeft {
  from { transform: translateX(-100%); opacity: 0; }
  to { transform: translateX(0); opacity: 1; }
}
.slide-in-left {
  animation: slideInLeft 0.5s ease-out forwards;
}

@keyframes slideOutRight {
  from { transform: translateX(0); opacity: 1; }
  to { transform: translateX(100%); opacity: 0; }
}
.slide-out-right {
  animation: slideOutRight 0.5s ease-out forwards;
}
";

/// Reset and ad container rules for a canvas.
#[must_use]
pub fn base_styles(canvas: &CanvasConfig) -> String {
    format!(
        "body, html {{ margin: 0; padding: 0; width: 100%; height: 100%; overflow: hidden; }}
#ad-container {{
  position: relative;
  width: {}px;
  height: {}px;
  background: {};
  overflow: hidden;
  margin: 0 auto;
}}
",
        canvas.width,
        canvas.height,
        canvas.background_color.as_str()
    )
}

/// The complete bundle stylesheet. `custom_css` is appended verbatim, last.
#[must_use]
pub fn stylesheet(canvas: &CanvasConfig, custom_css: &str) -> String {
    format!(
        "/* Global Animations */\n{GLOBAL_ANIMATIONS}\n/* Base Container */\n{}\n/* Custom CSS */\n{custom_css}\n",
        base_styles(canvas)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_container_uses_canvas_config() {
        let css = stylesheet(&CanvasConfig::default(), "");
        assert!(css.contains("width: 320px;"));
        assert!(css.contains("height: 480px;"));
        assert!(css.contains("background: #ffffff;"));
    }

    #[test]
    fn test_custom_css_comes_last() {
        let custom = ".rm-element { outline: 1px solid red; }";
        let css = stylesheet(&CanvasConfig::default(), custom);
        let custom_at = css.find(custom).expect("custom css");
        assert!(custom_at > css.find("#ad-container").expect("container"));
        assert!(custom_at > css.find("@keyframes slideOutRight").expect("keyframes"));
    }

    #[test]
    fn test_every_animation_class_is_defined() {
        for class in [
            "custom-pulse",
            "animate-bounce",
            "animate-spin",
            "animate-ping",
            "custom-shake",
            "custom-fade-in",
            "custom-slide-up",
            "slide-in-right",
            "slide-out-left",
            "slide-in-left",
            "slide-out-right",
            "infinite",
        ] {
            assert!(GLOBAL_ANIMATIONS.contains(&format!(".{class} {{")), "missing {class}");
        }
    }
}
