use leptos::prelude::*;
use leptos_meta::*;
use leptos_router::components::*;
use leptos_router::StaticSegment;

use shared::Spot;

use crate::display;
use crate::draft::SpotDraft;
use crate::overlay::Group;
use crate::regions;
use crate::view;

pub fn shell(options: LeptosOptions) -> impl IntoView {
    view! {
        <!DOCTYPE html>
        <html lang="en">
            <head>
                <meta charset="utf-8" />
                <meta name="viewport" content="width=device-width, initial-scale=1" />
                <AutoReload options=options.clone() />
                <HydrationScripts options />
                <MetaTags />
                <link
                    rel="stylesheet"
                    href="https://unpkg.com/leaflet@1.9.4/dist/leaflet.css"
                />
                <script src="https://unpkg.com/leaflet@1.9.4/dist/leaflet.js"></script>
            </head>
            <body>
                <App />
            </body>
        </html>
    }
}

/// Issues a spot fetch and applies the result to the overlay and the list,
/// unless a newer fetch has been started in the meantime.
#[cfg(feature = "hydrate")]
fn refresh_spots(filter: Option<String>, set_spots: WriteSignal<Vec<Spot>>) {
    let Some(ticket) = crate::map::with(|c| c.view.begin_spot_fetch()) else {
        return;
    };
    leptos::task::spawn_local(async move {
        match crate::api::fetch_spots(filter.as_deref()).await {
            Ok(list) => {
                if crate::map::with(|c| c.view.is_current(ticket)) != Some(true) {
                    return;
                }
                crate::map::with(|c| c.overlays.replace_spots(&list));
                set_spots.set(list);
            }
            // A failed read keeps the previous rendered state.
            Err(err) => web_sys::console::error_1(
                &format!("camping spot fetch failed: {err}").into(),
            ),
        }
    });
}

#[cfg(feature = "hydrate")]
fn load_shapes(group: Group) {
    leptos::task::spawn_local(async move {
        let fetched = match group {
            Group::Boundaries => crate::api::fetch_boundaries().await,
            Group::Roads => crate::api::fetch_roads().await,
            Group::Spots => return,
        };
        match fetched {
            Ok(collection) => {
                crate::map::with(|c| c.overlays.replace_shapes(group, collection));
            }
            Err(err) => web_sys::console::error_1(
                &format!("{} fetch failed: {err}", group.name()).into(),
            ),
        }
    });
}

fn set_layer_visible(group: Group, visible: bool) {
    #[cfg(feature = "hydrate")]
    {
        crate::map::with(|c| c.overlays.set_group_visible(group, visible));
    }
    #[cfg(not(feature = "hydrate"))]
    let _ = (group, visible);
}

#[component]
pub fn HomePage() -> impl IntoView {
    let (spots, set_spots) = signal(Vec::<Spot>::new());
    let (filter, set_filter) = signal(Option::<String>::None);
    let (notice, set_notice) = signal(Option::<String>::None);
    let (submitting, set_submitting) = signal(false);
    let click_to_add = RwSignal::new(false);

    let name = RwSignal::new(String::new());
    let location = RwSignal::new(String::new());
    let state_code = RwSignal::new(String::new());
    let description = RwSignal::new(String::new());
    let latitude = RwSignal::new(String::new());
    let longitude = RwSignal::new(String::new());

    #[cfg(feature = "hydrate")]
    Effect::new(move |_| {
        // Map clicks only seed a draft while the explicit toggle is on;
        // otherwise they stay plain pan/zoom interactions.
        crate::map::mount(move |lat, lng| {
            if click_to_add.get_untracked() {
                latitude.set(crate::draft::format_coordinate(lat));
                longitude.set(crate::draft::format_coordinate(lng));
            }
        });
        refresh_spots(None, set_spots);
        load_shapes(Group::Boundaries);
        load_shapes(Group::Roads);
    });

    let on_region_change = move |ev: leptos::ev::Event| {
        let code = event_target_value(&ev);
        let plan = {
            #[cfg(feature = "hydrate")]
            {
                crate::map::with(|c| c.view.select_region(&code))
                    .unwrap_or_else(|| view::plan_selection(&code))
            }
            #[cfg(not(feature = "hydrate"))]
            {
                view::plan_selection(&code)
            }
        };
        set_filter.set(plan.filter.clone());
        #[cfg(feature = "hydrate")]
        {
            if let Some(viewport) = plan.viewport {
                crate::map::with(|c| c.overlays.set_view(viewport));
            }
            refresh_spots(plan.filter, set_spots);
        }
    };

    let on_submit = move |ev: leptos::ev::SubmitEvent| {
        ev.prevent_default();
        if submitting.get_untracked() {
            return;
        }
        let draft = SpotDraft {
            name: name.get_untracked(),
            location: location.get_untracked(),
            state: state_code.get_untracked(),
            description: description.get_untracked(),
            latitude: latitude.get_untracked(),
            longitude: longitude.get_untracked(),
        };
        // Local validation; an incomplete draft never reaches the network.
        let new_spot = match draft.validate() {
            Ok(spot) => spot,
            Err(err) => {
                set_notice.set(Some(err.to_string()));
                return;
            }
        };
        #[cfg(feature = "hydrate")]
        {
            set_submitting.set(true);
            leptos::task::spawn_local(async move {
                match crate::api::submit_spot(&new_spot).await {
                    Ok(outcome) if outcome.success => {
                        let spot = new_spot.into_spot(outcome.id);
                        crate::map::with(|c| c.overlays.add_spot(&spot, true));
                        set_spots.update(|all| all.push(spot));
                        for field in [name, location, state_code, description, latitude, longitude]
                        {
                            field.set(String::new());
                        }
                        set_notice.set(Some("Spot added.".to_string()));
                    }
                    Ok(outcome) => {
                        let reason =
                            outcome.error.unwrap_or_else(|| "Unknown error".to_string());
                        set_notice.set(Some(format!("Error adding spot: {reason}")));
                    }
                    Err(err) => {
                        set_notice.set(Some(format!("Error adding spot: {err}")));
                    }
                }
                set_submitting.set(false);
            });
        }
        #[cfg(not(feature = "hydrate"))]
        let _ = new_spot;
    };

    view! {
        <div class="page">
            <header>
                <h1>"Dispersed Camping Map"</h1>
                <span class="tagline">
                    "Camping spots over national forest boundaries and roads"
                </span>
            </header>
            <main>
                <section class="map-pane">
                    <div id="map"></div>
                </section>
                <aside class="side-pane">
                    <section class="controls">
                        <label for="state-filter">"Filter by state"</label>
                        <select id="state-filter" on:change=on_region_change>
                            <option value="">"All States"</option>
                            {regions::known_codes()
                                .map(|code| view! { <option value=code>{code}</option> })
                                .collect_view()}
                        </select>
                        <fieldset class="layer-toggles">
                            <legend>"Layers"</legend>
                            <label>
                                <input
                                    type="checkbox"
                                    id="toggle-spots"
                                    checked=true
                                    on:change=move |ev| {
                                        set_layer_visible(Group::Spots, event_target_checked(&ev))
                                    }
                                />
                                "Camping spots"
                            </label>
                            <label>
                                <input
                                    type="checkbox"
                                    id="toggle-boundaries"
                                    checked=true
                                    on:change=move |ev| {
                                        set_layer_visible(
                                            Group::Boundaries,
                                            event_target_checked(&ev),
                                        )
                                    }
                                />
                                "Forest boundaries"
                            </label>
                            <label>
                                <input
                                    type="checkbox"
                                    id="toggle-roads"
                                    checked=true
                                    on:change=move |ev| {
                                        set_layer_visible(Group::Roads, event_target_checked(&ev))
                                    }
                                />
                                "Forest roads"
                            </label>
                        </fieldset>
                    </section>
                    <section>
                        <h2>"Camping spots"</h2>
                        <ul id="camping-list">
                            {move || {
                                let all = spots.get();
                                if all.is_empty() {
                                    view! {
                                        <li class="placeholder">
                                            {display::empty_list_line(filter.get().as_deref())}
                                        </li>
                                    }
                                        .into_any()
                                } else {
                                    all.iter()
                                        .map(|spot| view! { <li>{display::list_line(spot)}</li> })
                                        .collect_view()
                                        .into_any()
                                }
                            }}
                        </ul>
                    </section>
                    <section>
                        <h2>"Add a spot"</h2>
                        <label class="click-to-add">
                            <input
                                type="checkbox"
                                id="click-to-add"
                                on:change=move |ev| click_to_add.set(event_target_checked(&ev))
                            />
                            "Click the map to fill in coordinates"
                        </label>
                        <form id="add-spot-form" on:submit=on_submit>
                            <input
                                id="spot-name"
                                placeholder="Name"
                                prop:value=move || name.get()
                                on:input=move |ev| name.set(event_target_value(&ev))
                            />
                            <input
                                id="spot-location"
                                placeholder="Location"
                                prop:value=move || location.get()
                                on:input=move |ev| location.set(event_target_value(&ev))
                            />
                            <input
                                id="spot-state"
                                placeholder="State (e.g. CO)"
                                maxlength="2"
                                prop:value=move || state_code.get()
                                on:input=move |ev| state_code.set(event_target_value(&ev))
                            />
                            <textarea
                                id="spot-description"
                                placeholder="Description (optional)"
                                prop:value=move || description.get()
                                on:input=move |ev| description.set(event_target_value(&ev))
                            ></textarea>
                            <input
                                id="spot-latitude"
                                placeholder="Latitude (optional)"
                                prop:value=move || latitude.get()
                                on:input=move |ev| latitude.set(event_target_value(&ev))
                            />
                            <input
                                id="spot-longitude"
                                placeholder="Longitude (optional)"
                                prop:value=move || longitude.get()
                                on:input=move |ev| longitude.set(event_target_value(&ev))
                            />
                            <button type="submit" disabled=move || submitting.get()>
                                "Add Spot"
                            </button>
                        </form>
                        {move || {
                            notice.get().map(|text| view! { <p class="notice">{text}</p> })
                        }}
                    </section>
                </aside>
            </main>
        </div>
    }
}

#[component]
pub fn App() -> impl IntoView {
    provide_meta_context();

    view! {
        <Stylesheet href="/style.css" />
        <Title text="Dispersed Camping Map" />
        <Router>
            <Routes fallback=|| "Not Found">
                <Route path=StaticSegment("") view=HomePage />
            </Routes>
        </Router>
    }
}
