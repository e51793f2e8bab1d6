//! Mapping controls and message panel that live on the host page

use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, Event, HtmlElement, HtmlInputElement};

use crate::controller::{push_event, ControlEvent, EventQueue, InputEvent, MappingProfile, MessagePanel};
use crate::error::ControlBindingError;
use crate::model::MappingMode;

const MAPPING_RADIOS: &str = "input[name=\"mapping\"]";
const DISPLACEMENT_CHECKBOX: &str = "#displacement_mapping";
const LIGHT_SPEED: &str = "#lightSpeed";
const MESSAGE: &str = "#message";
const MESSAGE_TEXT: &str = "#messageText";

/// The page's message panel, written from session state after each tick
pub struct DomPanel {
    message: HtmlElement,
    message_text: Element,
    shown: MessagePanel,
}

impl DomPanel {
    pub fn sync(&mut self, panel: &MessagePanel) {
        if *panel == self.shown {
            return;
        }
        let display = if panel.visible { "block" } else { "none" };
        if self.message.style().set_property("display", display).is_err() {
            tracing::warn!("could not set display on {}", MESSAGE);
        }
        self.message_text.set_text_content(Some(&panel.text));
        self.shown = panel.clone();
    }
}

fn find(document: &Document, selector: &str) -> Result<Element, ControlBindingError> {
    document
        .query_selector(selector)
        .ok()
        .flatten()
        .ok_or_else(|| ControlBindingError::MissingElement { selector: selector.to_string() })
}

fn find_input(document: &Document, selector: &str) -> Result<HtmlInputElement, ControlBindingError> {
    find(document, selector)?
        .dyn_into::<HtmlInputElement>()
        .map_err(|_| ControlBindingError::WrongElementType { selector: selector.to_string(), expected: "input" })
}

/// Attach `handler` to `event` on `input`. Listeners live as long as the page.
fn listen(
    input: &HtmlInputElement,
    selector: &str,
    event: &'static str,
    handler: impl FnMut(Event) + 'static,
) -> Result<(), ControlBindingError> {
    let closure = Closure::wrap(Box::new(handler) as Box<dyn FnMut(Event)>);
    input
        .add_event_listener_with_callback(event, closure.as_ref().unchecked_ref())
        .map_err(|_| ControlBindingError::Listener { selector: selector.to_string(), event })?;
    closure.forget();
    Ok(())
}

fn bind_radios(document: &Document, events: &EventQueue, profile: MappingProfile) -> Result<(), ControlBindingError> {
    let missing = || ControlBindingError::MissingElement { selector: MAPPING_RADIOS.to_string() };
    let radios = document.query_selector_all(MAPPING_RADIOS).map_err(|_| missing())?;
    if radios.length() == 0 {
        return Err(missing());
    }

    for i in 0..radios.length() {
        let Some(node) = radios.item(i) else { continue };
        let radio = node.dyn_into::<HtmlInputElement>().map_err(|_| ControlBindingError::WrongElementType {
            selector: MAPPING_RADIOS.to_string(),
            expected: "input",
        })?;

        let mode = match radio.value().parse::<MappingMode>() {
            Ok(mode) => mode,
            Err(e) => {
                tracing::warn!("skipping mapping radio: {}", e);
                continue;
            }
        };
        if !profile.radio_modes().contains(&mode) {
            tracing::warn!("{:?} profile has no `{}` option, the radio will be ignored", profile, mode);
        }

        let events = events.clone();
        let target = radio.clone();
        listen(&radio, MAPPING_RADIOS, "change", move |_| {
            if target.checked() {
                push_event(&events, InputEvent::Control(ControlEvent::SelectMode(mode)));
            }
        })?;
    }
    Ok(())
}

/// Bind every control the profile needs. Any missing element fails startup.
pub fn bind(document: &Document, events: &EventQueue, profile: MappingProfile) -> Result<DomPanel, ControlBindingError> {
    bind_radios(document, events, profile)?;

    if profile.has_displacement_toggle() {
        let checkbox = find_input(document, DISPLACEMENT_CHECKBOX)?;
        let events = events.clone();
        let target = checkbox.clone();
        listen(&checkbox, DISPLACEMENT_CHECKBOX, "change", move |_| {
            push_event(&events, InputEvent::Control(ControlEvent::SetDisplacement(target.checked())));
        })?;
    }

    let slider = find_input(document, LIGHT_SPEED)?;
    {
        let events = events.clone();
        let target = slider.clone();
        listen(&slider, LIGHT_SPEED, "input", move |_| match target.value().parse::<f32>() {
            Ok(rate) => push_event(&events, InputEvent::Control(ControlEvent::SetLightRate(rate))),
            Err(_) => tracing::warn!("light speed `{}` is not a number", target.value()),
        })?;
    }

    let message = find(document, MESSAGE)?
        .dyn_into::<HtmlElement>()
        .map_err(|_| ControlBindingError::WrongElementType { selector: MESSAGE.to_string(), expected: "HTML element" })?;
    let message_text = find(document, MESSAGE_TEXT)?;

    tracing::info!("bound host page controls ({:?} profile)", profile);

    let mut panel = DomPanel { message, message_text, shown: MessagePanel::default() };
    // Force the first sync to write the hidden state
    panel.shown.visible = true;
    panel.sync(&MessagePanel::default());
    Ok(panel)
}
