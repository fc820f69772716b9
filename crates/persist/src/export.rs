//! Export text for the game build: the tile array, spawn macros, entity
//! initialisers and the door/switch registration block.

use crate::document::LEVEL_FORMAT_VERSION;
use raylevel_common::{EnemyKind, PickupKind};
use raylevel_kernel::{Level, Spawn, SpawnSlot, SwitchLink};

/// Level id used when none is given.
pub const DEFAULT_LEVEL_ID: &str = "e1m4";

/// Lowercase the id and drop whitespace; empty ids fall back to the default.
pub fn normalize_level_id(raw: &str) -> String {
    let id: String = raw
        .chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect();
    if id.is_empty() {
        DEFAULT_LEVEL_ID.to_string()
    } else {
        id
    }
}

/// File name for the saved header: only `[a-z0-9_]` survive, `map` if
/// nothing does.
pub fn export_file_name(raw_id: &str) -> String {
    let raw = raw_id.trim();
    let raw = if raw.is_empty() { DEFAULT_LEVEL_ID } else { raw };
    let safe: String = raw
        .to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || *c == '_')
        .collect();
    if safe.is_empty() {
        "map.h".to_string()
    } else {
        format!("{safe}.h")
    }
}

fn enemy_type_name(kind: EnemyKind) -> &'static str {
    match kind {
        EnemyKind::Zombie => "ETYPE_ZOMBIEMAN",
        EnemyKind::Sergeant => "ETYPE_SERGEANT",
        EnemyKind::Imp => "ETYPE_IMP",
        EnemyKind::Demon => "ETYPE_DEMON",
    }
}

fn enemy_health_name(kind: EnemyKind) -> &'static str {
    match kind {
        EnemyKind::Zombie => "ZOMBIE_HEALTH",
        EnemyKind::Sergeant => "SGT_HEALTH",
        EnemyKind::Imp => "IMP_HEALTH",
        EnemyKind::Demon => "DEMON_HEALTH",
    }
}

fn pickup_type_name(kind: PickupKind) -> &'static str {
    match kind {
        PickupKind::AmmoClip => "PICKUP_AMMO_CLIP",
        PickupKind::HealthSmall => "PICKUP_HEALTH_SMALL",
        PickupKind::HealthLarge => "PICKUP_HEALTH_LARGE",
        PickupKind::Shotgun => "PICKUP_WEAPON_SHOTGUN",
        PickupKind::Helmet => "PICKUP_HELMET",
        PickupKind::Armor => "PICKUP_ARMOR",
        PickupKind::Shells => "PICKUP_SHELLS",
        PickupKind::RocketLauncher => "PICKUP_WEAPON_ROCKET",
    }
}

/// Missing spawns export as tile 0,0 facing the default angle.
fn spawn_or_origin(level: &Level, slot: SpawnSlot) -> Spawn {
    level
        .entities()
        .spawn(slot)
        .unwrap_or(Spawn::new(Default::default()))
}

fn write_map(out: &mut String, level: &Level, id: &str) {
    let (w, h) = (level.width(), level.height());
    out.push_str(&format!("/* {id} map: {w}x{h} */\n"));
    out.push_str(&format!("const u8 {id}_map[{}] = {{\n", w as usize * h as usize));
    let tiles = level.grid().tiles();
    for (y, row) in tiles.chunks(w as usize).enumerate() {
        let cells: Vec<String> = row.iter().map(|t| t.id().to_string()).collect();
        let sep = if y + 1 < h as usize { "," } else { "" };
        out.push_str(&format!("/* Row {y} */ {}{sep}\n", cells.join(",")));
    }
    out.push_str("};\n\n");
}

fn write_spawn_macros(out: &mut String, level: &Level, id: &str, prefix: &str) {
    let s1 = spawn_or_origin(level, SpawnSlot::One);
    let s2 = spawn_or_origin(level, SpawnSlot::Two);
    out.push_str(&format!("/* {id} spawn and level data */\n"));
    out.push_str(&format!("#define {prefix}_SPAWN_X  ({} * 256 + 128)\n", s1.pos.x));
    out.push_str(&format!("#define {prefix}_SPAWN_Y  ({} * 256 + 128)\n", s1.pos.y));
    out.push_str(&format!("#define {prefix}_SPAWN2_X ({} * 256 + 128)\n", s2.pos.x));
    out.push_str(&format!("#define {prefix}_SPAWN2_Y ({} * 256 + 128)\n", s2.pos.y));
}

fn write_entity_inits(out: &mut String, level: &Level, prefix: &str) {
    let entities = level.entities();
    out.push_str(&format!(
        "/* Paste initEnemies{prefix}() into enemy.c and initPickups{prefix}() into pickup.c */\n"
    ));
    out.push_str(&format!("void initEnemies{prefix}(void) {{\n"));
    out.push_str("\tint i; for (i = 0; i < MAX_ENEMIES; i++) { g_enemies[i].active = false; g_enemies[i].enemyType = ETYPE_ZOMBIEMAN; }\n");
    for (i, e) in entities.enemies().iter().enumerate() {
        out.push_str(&format!("\tg_enemies[{i}].x = {} * 256 + 128;\n", e.pos.x));
        out.push_str(&format!("\tg_enemies[{i}].y = {} * 256 + 128;\n", e.pos.y));
        out.push_str(&format!("\tg_enemies[{i}].angle = {};\n", e.angle.units()));
        out.push_str(&format!("\tg_enemies[{i}].active = true;\n"));
        out.push_str(&format!("\tg_enemies[{i}].enemyType = {};\n", enemy_type_name(e.kind)));
        out.push_str(&format!("\tg_enemies[{i}].health = {};\n", enemy_health_name(e.kind)));
    }
    out.push_str("}\n\n");

    out.push_str(&format!("void initPickups{prefix}(void) {{\n"));
    out.push_str("\tint i; for (i = 0; i < MAX_PICKUPS; i++) g_pickups[i].active = false;\n");
    for (i, p) in entities.pickups().iter().enumerate() {
        out.push_str(&format!("\tg_pickups[{i}].x = {} * 256 + 128;\n", p.pos.x));
        out.push_str(&format!("\tg_pickups[{i}].y = {} * 256 + 128;\n", p.pos.y));
        out.push_str(&format!("\tg_pickups[{i}].type = {};\n", pickup_type_name(p.kind)));
        out.push_str(&format!("\tg_pickups[{i}].active = true;\n"));
    }
    out.push_str("}\n\n");
}

fn write_load_block(out: &mut String, level: &Level, id: &str, prefix: &str) {
    let (w, h) = (level.width(), level.height());
    let s1 = spawn_or_origin(level, SpawnSlot::One);
    out.push_str("/* In loadLevel(), paste the block below into: else if (levelNum == 4) { ... }\n");
    out.push_str("   (Assumes MAP_X/MAP_Y = 64 and your header is included from RayCasterData.h) */\n\n");
    out.push_str("/* ========== PASTE THIS INTO gameLoop.c inside else if (levelNum == 4) { ========== */\n");
    out.push_str(&format!("\t{{ u16 row; for (row = 0; row < {h}; row++) copymem((u8*)g_map + row * MAP_X, (const u8*){id}_map + row * {w}, {w}); }}\n"));
    out.push_str(&format!("\t{{ u16 i; for (i = {h} * MAP_X; i < MAP_CELLS; i++) ((u8*)g_map)[i] = 0; }}\n"));
    out.push_str(&format!("\t{{ u16 row; for (row = 0; row < {h}; row++) {{ u16 c; for (c = {w}; c < MAP_X; c++) ((u8*)g_map)[row * MAP_X + c] = 0; }} }}\n"));
    out.push_str(&format!("\tfPlayerX = {prefix}_SPAWN_X;\n"));
    out.push_str(&format!("\tfPlayerY = {prefix}_SPAWN_Y;\n"));
    out.push_str(&format!("\tfPlayerAng = {};\n", s1.angle.units()));
    out.push_str(&format!("\tinitEnemies{prefix}();\n"));
    out.push_str(&format!("\tinitPickups{prefix}();\n"));
    out.push_str("\tinitDoors();\n");

    let doors = level.doors();
    for door in &doors {
        let orientation = level.graph().orientation_of(door.pos);
        out.push_str(&format!(
            "\tregisterDoor({}, {});  /* door {}: wall {} */\n",
            door.pos.x,
            door.pos.y,
            door.index,
            orientation.code().to_uppercase()
        ));
    }
    for switch in level.switches() {
        let link = level.graph().link(switch.index).unwrap_or_default();
        let (kind, arg) = match link {
            SwitchLink::Exit => ("SW_EXIT", 0),
            SwitchLink::Door(n) => ("SW_DOOR", n),
        };
        out.push_str(&format!(
            "\tregisterSwitch({}, {}, {kind}, {arg});",
            switch.pos.x, switch.pos.y
        ));
        match link {
            SwitchLink::Door(n) if n >= doors.len() => {
                tracing::warn!(
                    switch = switch.index,
                    door = n,
                    doors = doors.len(),
                    "switch links to a door that does not exist"
                );
                out.push_str(&format!("  /* WARNING: door {n} does not exist */"));
            }
            _ => {}
        }
        out.push('\n');
    }
    out.push_str("/* ========== END PASTE ========== */\n");
}

/// Full export text. With `header_only` the map array and the entity
/// initialisers are left out.
pub fn export_source(level: &Level, raw_id: &str, header_only: bool) -> String {
    let id = normalize_level_id(raw_id);
    let prefix = id.to_uppercase();
    let mut out = String::new();
    out.push_str(&format!("/* VBDOOM_LEVEL_FORMAT {LEVEL_FORMAT_VERSION} */\n"));
    if !header_only {
        write_map(&mut out, level, &id);
    }
    write_spawn_macros(&mut out, level, &id, &prefix);
    out.push('\n');
    if !header_only {
        write_entity_inits(&mut out, level, &prefix);
    }
    write_load_block(&mut out, level, &id, &prefix);
    out
}

/// Content of the `.h` file: the map array and spawn macros only.
pub fn export_header_file(level: &Level, raw_id: &str) -> String {
    let id = normalize_level_id(raw_id);
    let prefix = id.to_uppercase();
    let mut out = String::new();
    out.push_str(&format!("/* VBDOOM_LEVEL_FORMAT {LEVEL_FORMAT_VERSION} */\n"));
    write_map(&mut out, level, &id);
    write_spawn_macros(&mut out, level, &id, &prefix);
    out
}
