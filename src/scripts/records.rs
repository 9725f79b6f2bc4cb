//! Medical records chase flow
//!
//! Calls a doctor's office ahead of a patient's procedure to track down
//! missing documents: confirm the office, have them locate the patient's
//! records, then ask them to send the outstanding items. Page numbering
//! follows the call-flow diagram.

use crate::call_tree::{
    CallParams, Directive, EventArgs, ParamSpec, Script, ScriptError, StateEntry, ToolSpec,
};

pub const NAME: &str = "records";

pub fn script() -> Result<Script, ScriptError> {
    Script::builder(NAME)
        .initial_state("page_1")
        .state("page_2")
        .state("page_3")
        .state("page_4")
        .state("page_7")
        .state("page_8")
        .state("page_11")
        .state("page_26")
        .on_enter("page_2", enter_page_2)
        .on_enter("page_3", enter_page_3)
        .on_enter("page_4", enter_page_4)
        .on_enter("page_7", enter_page_7)
        .on_enter("page_11", enter_page_11)
        .on_enter("page_26", enter_page_26)
        .transition("correct_office", "page_1", "page_2")
        .transition("not_available_now", "page_1", "page_8")
        .transition("wrong_number", "page_1", "page_11")
        .transition("records_located", "page_2", "page_3")
        .transition("records_not_found", "page_2", "page_26")
        .transition("will_send_documents", "page_3", "page_4")
        .transition("cannot_send_documents", "page_3", "page_7")
        .build()
}

/// Call parameters used when a start request does not supply its own.
pub fn demo_params() -> CallParams {
    CallParams::new()
        .with("patient_name", "Alice Adams")
        .with("office_name", "Dr. Carlson's office")
        .with("surgery", "knee replacement")
        .with(
            "documents",
            serde_json::json!([
                "Knee X-ray taken on October 8",
                "Lab tests performed on October 10",
            ]),
        )
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
     Ask for information in a clear and concise manner, ensuring not to \
     overwhelm the office staff.\n\n\
     Be patient and give the person on the other end time to respond to \
     your requests.\n\n\
     If the office staff needs time to locate the information, offer to \
     hold or suggest a callback time.\n\n\
     If the office cannot find the patient or encounters any issues, \
     apologize and inform them that someone from the hospital will follow \
     up."
}

fn name_param() -> ParamSpec {
    ParamSpec::string("name", "The name of the person you're speaking with.").required()
}

fn enter_page_2(params: &CallParams, _args: &EventArgs) -> StateEntry {
    let patient = params.str_value("patient_name").unwrap_or("the patient");
    let office = params.str_value("office_name").unwrap_or("your office");
    let surgery = params.str_value("surgery").unwrap_or("upcoming procedure");
    StateEntry::new(vec![
        Directive::append_system_message(
            "Now that you've confirmed you've reached the right office. You \
             need to determine whether they can locate the patient's \
             records. If they find the records, call the records_located \
             function. If they cannot find the patient or the records, call \
             the records_not_found function.",
        ),
        Directive::configure_tools(vec![
            ToolSpec::new(
                "records_located",
                "Call this function when the office confirms they can locate \
                 the patient's records.",
            )
            .with_param(name_param()),
            ToolSpec::new(
                "records_not_found",
                "Call this function if the office cannot find the patient or \
                 the records.",
            )
            .with_param(name_param()),
        ]),
        Directive::speak(format!(
            "Hi, this is Jackie calling from the hospital about {patient}'s \
             upcoming {surgery}. This call is recorded. We're missing a few \
             documents from {office}. Could you look up {patient}'s records \
             for me?"
        )),
    ])
    .with_disposition("confirmed office")
}

fn enter_page_3(params: &CallParams, _args: &EventArgs) -> StateEntry {
    let documents = speak_list(&params.str_values("documents"));
    StateEntry::new(vec![
        Directive::configure_tools(vec![
            ToolSpec::new(
                "will_send_documents",
                "Call this function when the office agrees to send the \
                 requested documents.",
            )
            .with_param(name_param()),
            ToolSpec::new(
                "cannot_send_documents",
                "Call this function if the office is unable to send the \
                 requested documents.",
            )
            .with_param(name_param()),
        ]),
        Directive::speak(format!(
            "Great, thank you. We still need the following: {documents}. \
             Could you fax or mail those over to us before the procedure?"
        )),
    ])
}

fn enter_page_4(_params: &CallParams, _args: &EventArgs) -> StateEntry {
    StateEntry::new(vec![Directive::speak(
        "Thank you so much for your help. Have a great day. Goodbye!",
    )])
    .with_disposition("office will send documents")
}

fn enter_page_7(_params: &CallParams, _args: &EventArgs) -> StateEntry {
    StateEntry::new(vec![Directive::speak(
        "I understand. Someone from the hospital will follow up to arrange \
         another way to get them. Thank you for your time. Goodbye!",
    )])
    .with_disposition("office unable to send documents")
}

fn enter_page_11(_params: &CallParams, _args: &EventArgs) -> StateEntry {
    StateEntry::new(vec![Directive::speak(
        "Sorry to bother you. Have a great day. Goodbye!",
    )])
    .with_disposition("reached wrong number")
}

fn enter_page_26(_params: &CallParams, _args: &EventArgs) -> StateEntry {
    StateEntry::new(vec![Directive::speak(
        "I understand. Apologies for the trouble. Someone from the hospital \
         will follow up with your office directly. Thank you for checking. \
         Goodbye!",
    )])
    .with_disposition("records not located")
}

/// Join items the way they should be read aloud.
fn speak_list(items: &[String]) -> String {
    match items {
        [] => String::new(),
        [only] => only.clone(),
        [rest @ .., last] => format!("{} and {}", rest.join(", "), last),
    }
}
