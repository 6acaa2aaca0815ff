use crate::components::format_time;
use threatboard::models::Ioc;
use yew::prelude::*;

#[derive(Properties, PartialEq)]
pub struct Props {
    pub iocs: Vec<Ioc>,
}

#[function_component(IocTable)]
pub fn ioc_table(props: &Props) -> Html {
    if props.iocs.is_empty() {
        return html! {<p class="empty">{"No IOCs."}</p>};
    }
    let rows: Vec<Html> = props
        .iocs
        .iter()
        .map(|ioc| {
            html! {
                <tr>
                    <td class={"left"}><span class={classes!("tag", ioc.ioc_type.as_str())}>{ioc.ioc_type}</span></td>
                    <td class={"mono left"}>{&ioc.value}</td>
                    <td class={"right"}>{format!("{:.0}%", ioc.confidence * 100.0)}</td>
                    <td class={"left context"}>{ioc.context.as_deref().unwrap_or_default()}</td>
                    <td class={"mono right"}>{format_time(&ioc.first_seen)}</td>
                    <td class={"mono right"}>{format_time(&ioc.last_seen)}</td>
                </tr>
            }
        })
        .collect();
    html! {
        <table class={"iocs"}>
            <tr>
                <th class={"left"}>{"Type"}</th>
                <th class={"left"}>{"Value"}</th>
                <th class={"right"}>{"Confidence"}</th>
                <th class={"left"}>{"Context"}</th>
                <th class={"right"}>{"First Seen"}</th>
                <th class={"right"}>{"Last Seen"}</th>
            </tr>
            {rows}
        </table>
    }
}
