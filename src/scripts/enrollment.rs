//! Enrollment follow-up flow
//!
//! Calls a prospect about a school program: confirm identity, check
//! whether they finished the online enrollment, and offer a warm transfer
//! to an admissions specialist. States are named after the pages of the
//! call-flow diagram, so the numbering is sparse.

use crate::call_tree::{
    CallParams, Directive, EventArgs, ParamSpec, Script, ScriptError, StateEntry, ToolSpec,
};

pub const NAME: &str = "enrollment";

pub fn script() -> Result<Script, ScriptError> {
    Script::builder(NAME)
        .initial_state("page_1")
        .state("page_2")
        .state("page_3")
        .state("page_4")
        .state("page_7")
        .state("page_8")
        .state("page_11")
        .state("page_17")
        .state("page_26")
        .on_enter("page_2", enter_page_2)
        .on_enter("page_3", enter_page_3)
        .on_enter("page_11", enter_page_11)
        .on_enter("page_26", enter_page_26)
        .transition("correct_person", "page_1", "page_2")
        .transition("not_available_now", "page_1", "page_8")
        .transition("wrong_number", "page_1", "page_11")
        .transition("why_calling", "page_1", "page_17")
        .transition("did_enrollment", "page_2", "page_7")
        .transition("no_enrollment_yet", "page_2", "page_3")
        .transition("yes_to_transfer", "page_3", "page_4")
        .transition("no_to_transfer", "page_3", "page_26")
        .build()
}

/// Call parameters used when a start request does not supply its own.
pub fn demo_params() -> CallParams {
    CallParams::new()
        .with("name", "Alex")
        .with("school", "Westfield College")
}

pub fn system_prompt() -> &'static str {
    "Conversational Style:\n\n\
     Make sure to ONLY ASK ONE QUESTION at a time to not overwhelm the user \
     and KEEP YOUR questions SHORT. Your communication style should be \
     proactive and lead the conversation, asking targeted questions. Ensure \
     your responses are concise, clear, and maintain a conversational tone. \
     If the user only partially answers a question, RE-ASK the part that \
     they forgot to answer.\n\n\
     Approach the conversation with a professional and courteous tone and \
     be friendly with them.\n\n\
     Be patient and give the person on the other end time to respond.\n\n\
     If the person is busy right now, apologize for the interruption and \
     offer to call back at a better time.\n\n\
     If the person is not interested, thank them for their time and end the \
     call politely."
}

fn name_param() -> ParamSpec {
    ParamSpec::string("name", "The name of the person you're speaking with.").required()
}

fn enter_page_2(params: &CallParams, _args: &EventArgs) -> StateEntry {
    let name = params.str_value("name").unwrap_or("there");
    let school = params.str_value("school").unwrap_or("the school");
    StateEntry::new(vec![
        Directive::append_system_message(
            "Now that you've confirmed you're speaking to the correct person. \
             You need to determine if they have already completed the online \
             enrollment process. If they have, call the did_enrollment \
             function. If they haven't and they are a new prospect, call the \
             no_enrollment_yet function.",
        ),
        Directive::configure_tools(vec![
            ToolSpec::new(
                "did_enrollment",
                "Call this function when the user confirms they've completed \
                 the online enrollment process.",
            )
            .with_param(name_param()),
            ToolSpec::new(
                "no_enrollment_yet",
                "Call this function when the user says that they haven't \
                 completed the online enrollment process yet.",
            )
            .with_param(name_param()),
        ]),
        Directive::speak(format!(
            "Hi {name}, this is Jackie from {school} and you can opt out of \
             this and future calls at any time. This call is recorded and \
             I'm calling about your interest in the School Program. Have you \
             already completed the online enrollment process?"
        )),
    ])
    .with_disposition("confirmed identity")
}

fn enter_page_3(_params: &CallParams, _args: &EventArgs) -> StateEntry {
    StateEntry::new(vec![
        Directive::configure_tools(vec![
            ToolSpec::new(
                "yes_to_transfer",
                "Call this function if the user agrees to be transferred to \
                 an admissions specialist.",
            )
            .with_param(name_param()),
            ToolSpec::new(
                "no_to_transfer",
                "Call this function if the user does not want to speak to an \
                 admissions specialist.",
            )
            .with_param(name_param()),
        ]),
        Directive::speak(
            "I would like to transfer you to an Admissions Specialist who \
             can give you some more information about the program and answer \
             any questions you might have. May I do this for you now?",
        ),
    ])
}

fn enter_page_11(_params: &CallParams, _args: &EventArgs) -> StateEntry {
    StateEntry::new(vec![Directive::speak(
        "Sorry to bother you. Have a great day. Goodbye!",
    )])
    .with_disposition("reached wrong number")
}

fn enter_page_26(_params: &CallParams, _args: &EventArgs) -> StateEntry {
    StateEntry::new(vec![Directive::speak(
        "That's okay. Thank you for your time. Have a nice day. Goodbye!",
    )])
    .with_disposition("Customer interested but refused warm transfer")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::call_tree::Conversation;
    use std::sync::Arc;

    fn start() -> Conversation {
        Conversation::new("test", Arc::new(script().unwrap()), demo_params())
    }

    #[test]
    fn test_script_builds() {
        let script = script().unwrap();
        assert_eq!(script.initial_state(), "page_1");
        assert_eq!(script.name(), NAME);
    }

    #[test]
    fn test_correct_person_greets_by_name() {
        let mut conv = start();
        let directives = conv.fire("correct_person", &EventArgs::new()).unwrap();
        assert_eq!(conv.current_state(), "page_2");
        assert_eq!(directives.len(), 3);

        assert!(matches!(
            &directives[0],
            Directive::AppendSystemMessage { content, .. }
                if content.contains("did_enrollment")
        ));
        let Directive::ConfigureTools { tools } = &directives[1] else {
            panic!("expected tools: {:?}", directives[1]);
        };
        let names: Vec<&str> = tools.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["did_enrollment", "no_enrollment_yet"]);
        assert!(matches!(
            &directives[2],
            Directive::Speak { text, persist: true, allow_interrupt: false }
                if text.contains("Hi Alex") && text.contains("Westfield College")
        ));
    }

    #[test]
    fn test_transfer_offer_swaps_tools() {
        let mut conv = start();
        conv.fire("correct_person", &EventArgs::new()).unwrap();
        let directives = conv.fire("no_enrollment_yet", &EventArgs::new()).unwrap();
        assert_eq!(conv.current_state(), "page_3");

        let Directive::ConfigureTools { tools } = &directives[0] else {
            panic!("expected tools first: {:?}", directives[0]);
        };
        let names: Vec<&str> = tools.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["yes_to_transfer", "no_to_transfer"]);
    }

    #[test]
    fn test_refused_transfer_ends_politely() {
        let mut conv = start();
        conv.fire("correct_person", &EventArgs::new()).unwrap();
        conv.fire("no_enrollment_yet", &EventArgs::new()).unwrap();
        let directives = conv.fire("no_to_transfer", &EventArgs::new()).unwrap();
        assert_eq!(conv.current_state(), "page_26");
        assert!(matches!(
            &directives[0],
            Directive::Speak { text, .. } if text.starts_with("That's okay.")
        ));
    }

    #[test]
    fn test_accepted_transfer_is_silent() {
        let mut conv = start();
        conv.fire("correct_person", &EventArgs::new()).unwrap();
        conv.fire("no_enrollment_yet", &EventArgs::new()).unwrap();
        let directives = conv.fire("yes_to_transfer", &EventArgs::new()).unwrap();
        assert_eq!(conv.current_state(), "page_4");
        assert!(directives.is_empty());
    }

    #[test]
    fn test_dispositions() {
        let script = script().unwrap();
        let entry = script.run_entry("page_2", &demo_params(), &EventArgs::new());
        assert_eq!(entry.disposition.as_deref(), Some("confirmed identity"));
        let entry = script.run_entry("page_26", &demo_params(), &EventArgs::new());
        assert_eq!(
            entry.disposition.as_deref(),
            Some("Customer interested but refused warm transfer")
        );
    }

    #[test]
    fn test_transfer_functions_unavailable_from_page_1() {
        let mut conv = start();
        let err = conv.fire("yes_to_transfer", &EventArgs::new()).unwrap_err();
        assert!(matches!(
            err,
            crate::call_tree::TransitionError::UnknownTransition { .. }
        ));
    }
}
