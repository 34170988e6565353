//! Headless two-peer run: a host and a guest wired through the in-memory
//! relay, proving that lobby convergence, enemy replication, and combat
//! reconciliation all work without a renderer or a socket in sight.

use anyhow::Result;
use brawl::{
    ActorState, FixedTimestep, InputFrame, Intents, LocalRelay, Session, SessionEvent,
    random_peer_id,
};

const RUN_TICKS: u32 = 600;
const FRAME_DT: f32 = 1.0 / 60.0;

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut rng = rand::thread_rng();
    let host_id = random_peer_id(&mut rng);
    let guest_id = random_peer_id(&mut rng);

    let mut relay = LocalRelay::new();
    let host_link = relay.endpoint();
    let guest_link = relay.endpoint();

    let mut host = Session::new(host_id.clone(), true, host_link);
    let mut guest = Session::new(guest_id.clone(), false, guest_link);

    host.connect();
    guest.connect();
    relay.pump();
    host.tick(InputFrame::idle());
    guest.tick(InputFrame::idle());
    relay.pump();

    host.start_game();
    relay.pump();
    guest.tick(InputFrame::idle());

    // A synthetic 60 fps render loop feeding the 30 Hz simulation.
    let mut timestep = FixedTimestep::default();
    let mut tick = 0u32;
    while tick < RUN_TICKS {
        timestep.accumulate(FRAME_DT);
        while timestep.consume_tick() && tick < RUN_TICKS {
            tick += 1;

            // The guest wanders right and swings now and then; the host
            // mashes attack so approaching enemies get met with fists.
            let guest_frame = if tick % 90 < 45 {
                InputFrame::held(Intents::RIGHT)
            } else {
                InputFrame::press(Intents::ATTACK)
            };
            let host_frame = if tick % 30 == 0 {
                InputFrame::press(Intents::ATTACK)
            } else {
                InputFrame::idle()
            };

            host.tick(host_frame);
            guest.tick(guest_frame);
            relay.pump();

            for event in host.drain_events() {
                report(&host_id, &event);
            }
            for event in guest.drain_events() {
                report(&guest_id, &event);
            }
        }
    }

    log::info!("--- after {RUN_TICKS} ticks ---");
    for session in [&host, &guest] {
        let who = &session.context().local_id;
        log::info!(
            "{who}: {} entities, {} weapons on the ground, {} items",
            session.world().len(),
            session.weapons().len(),
            session.items().len(),
        );
        for e in session.world().iter() {
            log::info!(
                "  {} [{:?}] hp={} at ({:.0}, {:.0}) {}",
                e.id,
                e.state,
                e.hp,
                e.pos.x,
                e.pos.z,
                if e.is_remote { "(mirror)" } else { "(authoritative)" },
            );
        }
    }

    let host_view: Vec<_> = collect_ids(&host);
    let guest_view: Vec<_> = collect_ids(&guest);
    if host_view == guest_view {
        log::info!("entity sets converged: {host_view:?}");
    } else {
        log::warn!("entity sets diverged: host {host_view:?} vs guest {guest_view:?}");
    }

    Ok(())
}

fn collect_ids(session: &Session<brawl::ChannelTransport>) -> Vec<String> {
    let mut ids: Vec<String> = session
        .world()
        .iter()
        .filter(|e| e.state != ActorState::Fallen)
        .map(|e| e.id.clone())
        .collect();
    ids.sort();
    ids
}

fn report(who: &str, event: &SessionEvent) {
    match event {
        SessionEvent::Connected => log::info!("{who} entered the lobby"),
        SessionEvent::RosterChanged => log::debug!("{who} saw the roster change"),
        SessionEvent::GameStarted => log::info!("{who} started the match"),
        SessionEvent::Disconnected => log::warn!("{who} lost the connection"),
        SessionEvent::GameOver => log::info!("{who} went down, game over"),
    }
}
