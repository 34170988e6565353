use rand::Rng;
use rand::rngs::ThreadRng;

use crate::ai;
use crate::combat::{self, CombatEvent, Move};
use crate::entity::{
    ActorState, Entity, EntityEvent, EntityId, Facing, PeerId, WeaponKind, World,
};
use crate::input::{InputFrame, Intents};
use crate::items::{GroundWeapon, Item, ItemKind, PROJECTILE_DAMAGE, Projectile};
use crate::net::{EntitySnapshot, Message, Transport, reconciler};

/// Tunables for one session.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub field_width: f32,
    pub z_min: f32,
    pub z_max: f32,
    pub walk_speed: f32,
    pub run_speed: f32,
    pub jump_impulse: f32,
    /// Per-tick chance the host spawns a replacement enemy.
    pub enemy_spawn_chance: f64,
    /// Per-tick chance the host rolls a weapon pickup.
    pub weapon_spawn_chance: f64,
    /// Chance a dying enemy leaves a restorative behind.
    pub item_drop_chance: f64,
    /// Ticks after game start before the first enemy appears.
    pub first_spawn_delay: u32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            field_width: 960.0,
            z_min: 0.0,
            z_max: 200.0,
            walk_speed: 4.0,
            run_speed: 9.0,
            jump_impulse: 12.0,
            enemy_spawn_chance: 0.02,
            weapon_spawn_chance: 0.002,
            item_drop_chance: 0.3,
            first_spawn_delay: 60,
        }
    }
}

/// Who this process is. Passed explicitly everywhere; there is no ambient
/// "current player".
#[derive(Debug, Clone)]
pub struct SessionContext {
    pub local_id: PeerId,
    pub is_host: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Disconnected,
    Connecting,
    Lobby,
    Active,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    Connected,
    RosterChanged,
    GameStarted,
    /// Reported exactly once; the session is terminal afterwards.
    Disconnected,
    GameOver,
}

/// Deferred outcome of one input frame, applied after the borrow of the
/// local player ends.
enum PlayerAction {
    None,
    Strike(Move),
    Blast,
    Heal,
    DropWeapon,
    PickupOrMelee,
}

/// One participant's full local copy of the world plus the reconciliation
/// around it. Owns every entity it spawned; mirrors everyone else's.
pub struct Session<T: Transport> {
    ctx: SessionContext,
    cfg: SessionConfig,
    phase: SessionPhase,
    world: World,
    items: Vec<Item>,
    weapons: Vec<GroundWeapon>,
    projectiles: Vec<Projectile>,
    transport: T,
    tick_count: u32,
    first_spawn_at: Option<u32>,
    rng: ThreadRng,
    events: Vec<SessionEvent>,
    reported_disconnect: bool,
    game_over: bool,
}

pub fn random_peer_id(rng: &mut impl Rng) -> PeerId {
    format!("user_{}", rng.gen_range(0..100_000))
}

impl<T: Transport> Session<T> {
    pub fn new(local_id: impl Into<PeerId>, is_host: bool, transport: T) -> Self {
        Self::with_config(local_id, is_host, transport, SessionConfig::default())
    }

    pub fn with_config(
        local_id: impl Into<PeerId>,
        is_host: bool,
        transport: T,
        cfg: SessionConfig,
    ) -> Self {
        Self {
            ctx: SessionContext {
                local_id: local_id.into(),
                is_host,
            },
            cfg,
            phase: SessionPhase::Disconnected,
            world: World::new(),
            items: Vec::new(),
            weapons: Vec::new(),
            projectiles: Vec::new(),
            transport,
            tick_count: 0,
            first_spawn_at: None,
            rng: rand::thread_rng(),
            events: Vec::new(),
            reported_disconnect: false,
            game_over: false,
        }
    }

    pub fn context(&self) -> &SessionContext {
        &self.ctx
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    pub fn local_player(&self) -> Option<&Entity> {
        self.world.get(&self.ctx.local_id)
    }

    pub fn roster(&self) -> Vec<crate::net::RosterEntry> {
        self.world.roster()
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn weapons(&self) -> &[GroundWeapon] {
        &self.weapons
    }

    pub fn projectiles(&self) -> &[Projectile] {
        &self.projectiles
    }

    pub fn is_game_over(&self) -> bool {
        self.game_over
    }

    pub fn drain_events(&mut self) -> Vec<SessionEvent> {
        std::mem::take(&mut self.events)
    }

    /// Announce ourselves and enter the lobby. The transport is assumed to
    /// be established; a dead one surfaces on the first tick.
    pub fn connect(&mut self) {
        if self.phase != SessionPhase::Disconnected || self.reported_disconnect {
            return;
        }
        self.phase = SessionPhase::Connecting;
        self.transport.send(&Message::Join {
            id: self.ctx.local_id.clone(),
            is_host: self.ctx.is_host,
        });

        let mut me = Entity::player(self.ctx.local_id.clone(), 100.0, 100.0);
        me.is_host = self.ctx.is_host;
        self.world.insert(me);

        self.phase = SessionPhase::Lobby;
        self.events.push(SessionEvent::Connected);
        log::info!(
            "{} connected as {}",
            self.ctx.local_id,
            if self.ctx.is_host { "host" } else { "guest" }
        );
    }

    /// Any participant may start the match; everyone transitions on receipt.
    pub fn start_game(&mut self) {
        if self.phase != SessionPhase::Lobby {
            return;
        }
        self.transport.send(&Message::StartGame);
        self.launch();
    }

    /// One 30 Hz simulation step. Inbound messages are applied up front,
    /// never mid-tick.
    pub fn tick(&mut self, frame: InputFrame) {
        if self.phase == SessionPhase::Disconnected {
            return;
        }
        self.pump_messages();
        if self.phase != SessionPhase::Active {
            return;
        }

        self.tick_count = self.tick_count.wrapping_add(1);

        if !self.game_over {
            self.apply_local_input(frame);
            let attacks = ai::step_enemies(&mut self.world, &self.ctx.local_id, &mut self.rng);
            for (id, mv) in attacks {
                self.perform_move(&id, mv);
            }
            self.host_ambient_spawns();
        }

        self.step_entities();
        self.step_projectiles();
        self.step_transients();
        self.broadcast();
        self.world.purge_removed();
        self.check_game_over();
    }

    /// Host-only: create an enemy and announce it. Non-hosts get `None`.
    pub fn spawn_enemy_at(&mut self, x: f32, z: f32) -> Option<EntityId> {
        if !self.ctx.is_host {
            return None;
        }
        let id = format!("enemy_{}", self.rng.gen_range(0..10_000));
        self.transport.send(&Message::SpawnEnemy {
            id: id.clone(),
            owner_id: self.ctx.local_id.clone(),
            x,
            z,
        });

        let mut enemy = Entity::enemy(id.clone(), self.ctx.local_id.clone(), x, z);
        enemy.facing = Facing::Left;
        self.world.insert(enemy);
        log::debug!("spawned {id} at ({x}, {z})");
        Some(id)
    }

    fn pump_messages(&mut self) {
        for msg in self.transport.poll() {
            self.handle_message(msg);
        }
        if !self.transport.is_open() {
            self.fail_connection();
        }
    }

    fn handle_message(&mut self, msg: Message) {
        match msg {
            Message::Join { id, is_host } => self.handle_join(id, is_host),
            Message::LobbyUpdate { players } => {
                let mut changed = false;
                for p in players {
                    if p.id != self.ctx.local_id && !self.world.contains(&p.id) {
                        let mut e = Entity::player(p.id.clone(), 100.0, 100.0).into_remote();
                        e.is_host = p.is_host;
                        self.world.insert(e);
                        changed = true;
                    }
                }
                if changed {
                    self.events.push(SessionEvent::RosterChanged);
                }
            }
            Message::StartGame => self.launch(),
            Message::StateUpdate { data } => self.handle_state_update(data),
            Message::SpawnEnemy { id, owner_id, x, z } => {
                if !self.world.contains(&id) {
                    log::debug!("peer {owner_id} spawned {id}");
                    self.world
                        .insert(Entity::enemy(id, owner_id, x, z).into_remote());
                }
            }
            Message::Hit {
                target_id,
                damage,
                force_x,
                force_y,
            } => {
                // Only the owner applies damage; everyone else's copy of this
                // entity is corrected by the owner's next snapshot.
                let owned = self
                    .world
                    .get(&target_id)
                    .is_some_and(|t| !t.is_remote && t.owner == self.ctx.local_id);
                if owned {
                    self.damage_owned(&target_id, damage, force_x, force_y);
                }
            }
            Message::Remove { id } => {
                if let Some(e) = self.world.get_mut(&id) {
                    e.marked_for_removal = true;
                }
            }
        }
    }

    fn handle_join(&mut self, id: PeerId, is_host: bool) {
        if id != self.ctx.local_id && !self.world.contains(&id) {
            let mut p = Entity::player(id.clone(), 100.0, 100.0).into_remote();
            p.is_host = is_host;
            self.world.insert(p);
            self.events.push(SessionEvent::RosterChanged);
            log::info!("{id} joined");
        }
        if self.ctx.is_host {
            // Full-roster resync so late joiners converge without history.
            let players = self.world.roster();
            self.transport.send(&Message::LobbyUpdate { players });
        }
    }

    fn handle_state_update(&mut self, snap: EntitySnapshot) {
        reconciler::apply_snapshot(&mut self.world, &self.ctx.local_id, snap);
    }

    fn launch(&mut self) {
        if self.phase == SessionPhase::Active || self.phase == SessionPhase::Disconnected {
            return;
        }
        self.phase = SessionPhase::Active;
        self.events.push(SessionEvent::GameStarted);
        if self.ctx.is_host {
            self.first_spawn_at = Some(self.tick_count + self.cfg.first_spawn_delay);
        }
        log::info!("match started");
    }

    fn fail_connection(&mut self) {
        if self.reported_disconnect {
            return;
        }
        self.reported_disconnect = true;
        self.phase = SessionPhase::Disconnected;
        self.events.push(SessionEvent::Disconnected);
        log::warn!("connection lost; session cannot resume");
    }

    /// The control table: translate this tick's intents into movement and at
    /// most one deferred action. Every costed move is gated on affordability
    /// here; nothing downstream checks again.
    fn apply_local_input(&mut self, frame: InputFrame) {
        let local_id = self.ctx.local_id.clone();
        let cfg = self.cfg.clone();

        let action = {
            let Some(player) = self.world.get_mut(&local_id) else {
                return;
            };
            if player.state.blocks_input() {
                return;
            }

            let defend = frame.held.contains(Intents::DEFEND);

            // Chords consume the whole frame.
            if defend && frame.held.contains(Intents::DOWN) && frame.pressed.contains(Intents::JUMP)
            {
                PlayerAction::DropWeapon
            } else if defend
                && frame.held.contains(Intents::UP)
                && frame.pressed.contains(Intents::JUMP)
            {
                if player.mp >= Move::Heal.mp_cost() {
                    PlayerAction::Heal
                } else {
                    PlayerAction::None
                }
            } else {
                let mut action = PlayerAction::None;

                if player.state == ActorState::Run {
                    let dir_held = match player.facing {
                        Facing::Right => frame.held.contains(Intents::RIGHT),
                        Facing::Left => frame.held.contains(Intents::LEFT),
                    };
                    if !dir_held {
                        player.set_state(ActorState::Idle);
                    } else {
                        player.vel.x = player.facing.sign() * cfg.run_speed;
                        let mut dz = 0.0;
                        if frame.held.contains(Intents::UP) {
                            dz = -cfg.walk_speed * 0.8;
                        }
                        if frame.held.contains(Intents::DOWN) {
                            dz = cfg.walk_speed * 0.8;
                        }
                        player.pos.z += dz;
                    }

                    if frame.pressed.contains(Intents::ATTACK) {
                        action = PlayerAction::Strike(Move::RunAttack);
                    } else if frame.pressed.contains(Intents::JUMP) && player.grounded() {
                        player.vel.y = cfg.jump_impulse;
                        player.state = ActorState::Jump;
                    }
                } else {
                    if !player.state.is_action() {
                        let mut dx = 0.0;
                        let mut dz = 0.0;
                        if frame.held.contains(Intents::LEFT) {
                            dx = -cfg.walk_speed;
                            player.facing = Facing::Left;
                        }
                        if frame.held.contains(Intents::RIGHT) {
                            dx = cfg.walk_speed;
                            player.facing = Facing::Right;
                        }
                        if frame.held.contains(Intents::UP) {
                            dz = -cfg.walk_speed * 0.7;
                        }
                        if frame.held.contains(Intents::DOWN) {
                            dz = cfg.walk_speed * 0.7;
                        }

                        if dx != 0.0 || dz != 0.0 {
                            player.vel.x = dx;
                            player.pos.z += dz;
                            if player.state == ActorState::Idle && player.grounded() {
                                player.state = ActorState::Walk;
                            }
                        } else if player.state == ActorState::Walk && player.grounded() {
                            player.state = ActorState::Idle;
                        }

                        if let Some(dir) = frame.double_tap {
                            if player.grounded()
                                && matches!(player.state, ActorState::Idle | ActorState::Walk)
                            {
                                player.facing = dir;
                                player.state = ActorState::Run;
                                player.state_timer = 0;
                            }
                        }
                    }

                    if frame.pressed.contains(Intents::JUMP)
                        && player.grounded()
                        && !player.state.is_action()
                    {
                        player.vel.y = cfg.jump_impulse;
                        player.state = ActorState::Jump;
                    }

                    if defend {
                        player.set_state(ActorState::Defend);
                        player.vel.x = 0.0;
                    }

                    if frame.pressed.contains(Intents::ATTACK) {
                        if player.state == ActorState::Jump {
                            action = PlayerAction::Strike(Move::JumpKick);
                        } else if defend {
                            if frame.held.contains(Intents::UP)
                                && player.mp >= Move::Uppercut.mp_cost()
                            {
                                action = PlayerAction::Strike(Move::Uppercut);
                            } else if frame.held.contains(Intents::DOWN)
                                && player.mp >= Move::Whirlwind.mp_cost()
                            {
                                action = PlayerAction::Strike(Move::Whirlwind);
                            } else if frame
                                .held
                                .intersects(Intents::LEFT | Intents::RIGHT)
                                && player.mp >= Move::Blast.mp_cost()
                            {
                                action = PlayerAction::Blast;
                            }
                        } else if !matches!(
                            player.state,
                            ActorState::Attack
                                | ActorState::Hurt
                                | ActorState::Uppercut
                                | ActorState::Whirlwind
                                | ActorState::Heal
                                | ActorState::JumpKick
                                | ActorState::WeaponAttack
                        ) && player.grounded()
                        {
                            action = PlayerAction::PickupOrMelee;
                        }
                    }
                }
                action
            }
        };

        match action {
            PlayerAction::None => {}
            PlayerAction::Strike(mv) => self.perform_move(&local_id, mv),
            PlayerAction::Blast => self.perform_move(&local_id, Move::Blast),
            PlayerAction::Heal => self.perform_move(&local_id, Move::Heal),
            PlayerAction::DropWeapon => self.drop_weapon(&local_id),
            PlayerAction::PickupOrMelee => {
                if self.try_pickup_weapon(&local_id) {
                    return;
                }
                let armed = self
                    .world
                    .get(&local_id)
                    .is_some_and(|p| p.weapon.is_some());
                let mv = if armed { Move::WeaponSwing } else { Move::Punch };
                self.perform_move(&local_id, mv);
            }
        }
    }

    /// Execute a move for an entity we own. Affordability was checked by the
    /// caller; costs are deducted here without refunds.
    fn perform_move(&mut self, actor_id: &str, mv: Move) {
        match mv {
            Move::Blast => {
                let Some(actor) = self.world.get_mut(actor_id) else {
                    return;
                };
                actor.mp -= Move::Blast.mp_cost();
                actor.set_state(ActorState::Attack);
                let projectile = Projectile::fired_by(actor);
                self.projectiles.push(projectile);
            }
            Move::Heal => {
                let Some(actor) = self.world.get_mut(actor_id) else {
                    return;
                };
                actor.mp -= Move::Heal.mp_cost();
                actor.set_state(ActorState::Heal);
                actor.heal(20);
            }
            _ => {
                let events =
                    combat::perform_strike(&mut self.world, actor_id, mv, &self.ctx.local_id);
                self.process_combat_events(events);
            }
        }
    }

    fn process_combat_events(&mut self, events: Vec<CombatEvent>) {
        for event in events {
            match event {
                CombatEvent::HitIntent {
                    target,
                    damage,
                    force_x,
                    force_y,
                } => {
                    self.transport.send(&Message::Hit {
                        target_id: target,
                        damage,
                        force_x,
                        force_y,
                    });
                }
                CombatEvent::WeaponDropped { kind, x, z, facing } => {
                    self.weapons.push(GroundWeapon::dropped(x, z, kind, facing));
                }
                CombatEvent::Damaged { .. } => {}
            }
        }
    }

    /// Owner-side damage entry point for hit intents and projectiles.
    fn damage_owned(&mut self, target_id: &str, amount: i32, force_x: f32, force_y: f32) {
        let Some(target) = self.world.get_mut(target_id) else {
            return;
        };
        if let Some(outcome) = target.take_damage(amount, force_x, force_y) {
            if let Some(kind) = outcome.dropped {
                let (x, z, facing) = (target.pos.x, target.pos.z, target.facing);
                self.weapons.push(GroundWeapon::dropped(x, z, kind, facing));
            }
        }
    }

    fn drop_weapon(&mut self, actor_id: &str) {
        let Some(actor) = self.world.get_mut(actor_id) else {
            return;
        };
        let Some(kind) = actor.weapon.take() else {
            return;
        };
        let (x, z, facing) = (actor.pos.x, actor.pos.z, actor.facing);
        self.weapons.push(GroundWeapon::dropped(x, z, kind, facing));
    }

    fn try_pickup_weapon(&mut self, actor_id: &str) -> bool {
        let Some(actor) = self.world.get_mut(actor_id) else {
            return false;
        };
        if actor.weapon.is_some() {
            return false;
        }
        for w in &mut self.weapons {
            if w.in_pickup_range(actor) {
                actor.weapon = Some(w.kind);
                w.marked_for_removal = true;
                return true;
            }
        }
        false
    }

    fn host_ambient_spawns(&mut self) {
        if !self.ctx.is_host {
            return;
        }

        if let Some(at) = self.first_spawn_at {
            if self.tick_count >= at {
                self.first_spawn_at = None;
                let z = self.rng.gen_range(self.cfg.z_min..self.cfg.z_max);
                self.spawn_enemy_at(self.cfg.field_width + 50.0, z);
            }
        }

        if self.world.live_enemy_count() < 1 && self.rng.gen_bool(self.cfg.enemy_spawn_chance) {
            let z = self.rng.gen_range(self.cfg.z_min..self.cfg.z_max);
            self.spawn_enemy_at(self.cfg.field_width + 50.0, z);
        }

        if self.rng.gen_bool(self.cfg.weapon_spawn_chance) {
            let kinds = [WeaponKind::Bat, WeaponKind::Sword, WeaponKind::Spear];
            let kind = kinds[self.rng.gen_range(0..kinds.len())];
            let x = 50.0 + self.rng.gen_range(0.0..self.cfg.field_width - 100.0);
            let z = self.rng.gen_range(self.cfg.z_min..self.cfg.z_max);
            self.weapons.push(GroundWeapon::from_sky(x, z, kind));
        }
    }

    fn step_entities(&mut self) {
        let tick = self.tick_count;
        let mut events = Vec::new();
        for e in self.world.iter_mut() {
            if e.marked_for_removal {
                continue;
            }
            if e.is_remote {
                e.step_remote();
            } else {
                events.extend(e.step_local(tick));
            }
        }

        for event in events {
            match event {
                EntityEvent::EnemyExpired { id, x, z } => {
                    self.transport.send(&Message::Remove { id });
                    if self.rng.gen_bool(self.cfg.item_drop_chance) {
                        let kind = if self.rng.gen_bool(0.5) {
                            ItemKind::Hp
                        } else {
                            ItemKind::Mp
                        };
                        self.items.push(Item::new(x, z, kind));
                    }
                }
            }
        }
    }

    fn step_projectiles(&mut self) {
        let mut hits = Vec::new();
        for p in &mut self.projectiles {
            p.step();
            if p.expired() {
                continue;
            }
            if let Some(target) = self
                .world
                .iter()
                .find(|e| !e.marked_for_removal && p.collides(e))
            {
                hits.push((target.id.clone(), p.force_x()));
                p.life = 0;
            }
        }
        for (target_id, force_x) in hits {
            self.resolve_projectile_hit(&target_id, force_x);
        }
        self.projectiles.retain(|p| !p.expired());
    }

    fn resolve_projectile_hit(&mut self, target_id: &str, force_x: f32) {
        let foreign = {
            let Some(target) = self.world.get_mut(target_id) else {
                return;
            };
            if target.is_remote || target.owner != self.ctx.local_id {
                target.set_state(ActorState::Hurt);
                target.vel.x = force_x;
                true
            } else {
                false
            }
        };

        if foreign {
            self.transport.send(&Message::Hit {
                target_id: target_id.to_string(),
                damage: PROJECTILE_DAMAGE,
                force_x,
                force_y: 0.0,
            });
        } else {
            self.damage_owned(target_id, PROJECTILE_DAMAGE, force_x, 0.0);
        }
    }

    fn step_transients(&mut self) {
        let tick = self.tick_count;
        for w in &mut self.weapons {
            w.step(tick);
        }
        for item in &mut self.items {
            item.step();
        }

        if let Some(player) = self.world.get_mut(&self.ctx.local_id) {
            if player.hp > 0 && !player.is_remote {
                for item in self.items.iter_mut().filter(|i| !i.marked_for_removal) {
                    if item.in_pickup_range(player) {
                        item.collect(player);
                    }
                }
            }
        }

        self.weapons.retain(|w| !w.marked_for_removal);
        self.items.retain(|i| !i.marked_for_removal);
    }

    fn broadcast(&mut self) {
        if !reconciler::should_broadcast(self.tick_count) {
            return;
        }
        for msg in reconciler::outbound_snapshots(&self.world, &self.ctx.local_id) {
            self.transport.send(&msg);
        }
    }

    fn check_game_over(&mut self) {
        if self.game_over {
            return;
        }
        if let Some(p) = self.world.get(&self.ctx.local_id) {
            if p.hp <= 0 {
                self.game_over = true;
                self.events.push(SessionEvent::GameOver);
                log::info!("{} is down; game over", self.ctx.local_id);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::net::{ChannelTransport, LocalRelay};

    // Ambient spawn rolls are disabled so assertions stay deterministic.
    fn quiet_config() -> SessionConfig {
        SessionConfig {
            enemy_spawn_chance: 0.0,
            weapon_spawn_chance: 0.0,
            first_spawn_delay: 100_000,
            ..SessionConfig::default()
        }
    }

    fn connected_pair() -> (LocalRelay, Session<ChannelTransport>, Session<ChannelTransport>) {
        let mut relay = LocalRelay::new();
        let host_link = relay.endpoint();
        let guest_link = relay.endpoint();
        let mut host = Session::with_config("user_host", true, host_link, quiet_config());
        let mut guest = Session::with_config("user_guest", false, guest_link, quiet_config());
        host.connect();
        guest.connect();
        relay.pump();
        host.tick(InputFrame::idle());
        guest.tick(InputFrame::idle());
        relay.pump();
        host.tick(InputFrame::idle());
        guest.tick(InputFrame::idle());
        (relay, host, guest)
    }

    #[test]
    fn host_answers_join_with_roster() {
        let (_relay, host, guest) = connected_pair();
        assert_eq!(host.roster().len(), 2);
        assert_eq!(guest.roster().len(), 2);
        assert!(guest.world().get("user_host").unwrap().is_remote);
        assert!(guest.world().get("user_host").unwrap().is_host);
    }

    #[test]
    fn start_game_flips_every_participant() {
        let (mut relay, mut host, mut guest) = connected_pair();
        guest.start_game();
        assert_eq!(guest.phase(), SessionPhase::Active);

        relay.pump();
        host.tick(InputFrame::idle());
        assert_eq!(host.phase(), SessionPhase::Active);
        assert!(host.drain_events().contains(&SessionEvent::GameStarted));
    }

    #[test]
    fn hit_is_ignored_unless_we_own_the_target() {
        let (_relay, mut host, _guest) = connected_pair();
        // A hit request for the guest's player reaches the host too; the
        // host must not touch it.
        host.handle_message(Message::Hit {
            target_id: "user_guest".into(),
            damage: 40,
            force_x: 5.0,
            force_y: 0.0,
        });
        assert_eq!(host.world().get("user_guest").unwrap().hp, 100);

        host.handle_message(Message::Hit {
            target_id: "user_host".into(),
            damage: 40,
            force_x: 5.0,
            force_y: 0.0,
        });
        assert_eq!(host.world().get("user_host").unwrap().hp, 60);
    }

    #[test]
    fn hit_for_unknown_target_is_a_silent_noop() {
        let (_relay, mut host, _guest) = connected_pair();
        host.handle_message(Message::Hit {
            target_id: "enemy_404".into(),
            damage: 40,
            force_x: 5.0,
            force_y: 0.0,
        });
    }

    #[test]
    fn unaffordable_whirlwind_does_not_execute() {
        let (mut relay, mut host, mut guest) = connected_pair();
        host.start_game();
        relay.pump();
        guest.tick(InputFrame::idle());

        host.world_mut().get_mut("user_host").unwrap().mp = 10;
        let frame = InputFrame {
            held: Intents::DEFEND | Intents::DOWN,
            pressed: Intents::ATTACK,
            double_tap: None,
        };
        host.tick(frame);

        let player = host.local_player().unwrap();
        assert_ne!(player.state, ActorState::Whirlwind);
        assert_eq!(player.mp, 10);
    }

    #[test]
    fn duplicate_join_does_not_duplicate_roster() {
        let (_relay, mut host, _guest) = connected_pair();
        host.handle_message(Message::Join {
            id: "user_guest".into(),
            is_host: false,
        });
        assert_eq!(host.roster().len(), 2);
    }

    #[test]
    fn remove_message_tombstones_the_copy() {
        let (mut relay, mut host, mut guest) = connected_pair();
        host.start_game();
        relay.pump();
        guest.tick(InputFrame::idle());

        let id = host.spawn_enemy_at(500.0, 100.0).unwrap();
        relay.pump();
        guest.tick(InputFrame::idle());
        assert!(guest.world().contains(&id));

        guest.handle_message(Message::Remove { id: id.clone() });
        guest.tick(InputFrame::idle());
        assert!(!guest.world().contains(&id));
    }

    #[test]
    fn non_host_cannot_spawn_enemies() {
        let (_relay, _host, mut guest) = connected_pair();
        assert!(guest.spawn_enemy_at(500.0, 100.0).is_none());
    }

    #[test]
    fn disconnect_is_reported_exactly_once() {
        let mut relay = LocalRelay::new();
        let link = relay.endpoint();
        let mut session = Session::new("user_1", true, link);
        session.connect();
        drop(relay);

        session.tick(InputFrame::idle());
        let events = session.drain_events();
        assert_eq!(
            events.iter().filter(|e| **e == SessionEvent::Disconnected).count(),
            1
        );

        session.tick(InputFrame::idle());
        assert!(session.drain_events().is_empty());
        assert_eq!(session.phase(), SessionPhase::Disconnected);
    }

    #[test]
    fn drop_chord_leaves_the_weapon_on_the_ground() {
        let (mut relay, mut host, mut guest) = connected_pair();
        host.start_game();
        relay.pump();
        guest.tick(InputFrame::idle());

        host.world_mut().get_mut("user_host").unwrap().weapon = Some(WeaponKind::Bat);
        let frame = InputFrame {
            held: Intents::DEFEND | Intents::DOWN,
            pressed: Intents::JUMP,
            double_tap: None,
        };
        host.tick(frame);

        assert_eq!(host.local_player().unwrap().weapon, None);
        assert_eq!(host.weapons().len(), 1);
        assert_eq!(host.weapons()[0].kind, WeaponKind::Bat);
    }
}
