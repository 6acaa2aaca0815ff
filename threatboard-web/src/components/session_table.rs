use crate::components::{format_optional_time, format_time};
use threatboard::models::ScrapeSession;
use yew::prelude::*;

#[derive(Properties, PartialEq)]
pub struct Props {
    pub sessions: Vec<ScrapeSession>,
    #[prop_or_default]
    pub selected: Option<u64>,
    /// Called with the session id when a row is clicked.
    #[prop_or_default]
    pub onselect: Option<Callback<u64>>,
}

#[function_component(SessionTable)]
pub fn session_table(props: &Props) -> Html {
    if props.sessions.is_empty() {
        return html! {<p class="empty">{"No sessions."}</p>};
    }
    let rows: Vec<Html> = props
        .sessions
        .iter()
        .map(|session| {
            let id = session.id;
            let onclick = props
                .onselect
                .clone()
                .map(|onselect| Callback::from(move |_: MouseEvent| onselect.emit(id)));
            let class = classes!(
                "session",
                (props.selected == Some(id)).then_some("active")
            );
            let source = session
                .source_url_id
                .map(|source| format!("source #{}", source))
                .unwrap_or_else(|| "ad-hoc".to_string());
            html! {
                <tr {class} {onclick}>
                    <td class={"mono left"}>{id}</td>
                    <td class={"left"}>{source}</td>
                    <td class={classes!("left", "status", session.status.to_string())}>{session.status}</td>
                    <td class={"right"}>{session.iocs_found}</td>
                    <td class={"mono right"}>{format_time(&session.started_at)}</td>
                    <td class={"mono right"}>{format_optional_time(&session.completed_at)}</td>
                    <td class={"left error"}>{session.error_message.as_deref().unwrap_or_default()}</td>
                </tr>
            }
        })
        .collect();
    html! {
        <table class={"sessions"}>
            <tr>
                <th class={"left"}>{"ID"}</th>
                <th class={"left"}>{"Origin"}</th>
                <th class={"left"}>{"Status"}</th>
                <th class={"right"}>{"IOCs"}</th>
                <th class={"right"}>{"Started"}</th>
                <th class={"right"}>{"Completed"}</th>
                <th class={"left"}>{"Error"}</th>
            </tr>
            {rows}
        </table>
    }
}
