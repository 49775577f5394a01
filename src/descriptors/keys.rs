//! Constants for descriptor member names, plus the declarative field rules
//! that map one logical field onto its current and legacy keys.
//!
//! Adding support for a new data release should mean adding rule entries
//! here, not new branches in the resolvers.

use crate::recognized::Token;

// Weapon manager
pub const SALVOS: &str = "Salves";
pub const TURRET_DESCRIPTOR_LIST: &str = "TurretDescriptorList";
pub const MOUNTED_WEAPON_DESCRIPTOR_LIST: &str = "MountedWeaponDescriptorList";
pub const AMMUNITION: &str = "Ammunition";
pub const NB_WEAPONS: &str = "NbWeapons";
pub const SALVO_STOCK_INDEX: &str = "SalvoStockIndex";
pub const SHOW_IN_INTERFACE: &str = "ShowInInterface";
pub const SMOKE_VEHICLE_AMMO: &str = "Ammo_SMOKE_Vehicle";

// Ammunition
pub const NAME_TOKEN: &str = "Name";
pub const INTERFACE_WEAPON_TEXTURE: &str = "InterfaceWeaponTexture";
pub const TEXTURE_PREFIX: &str = "Texture_Interface_Weapon_";
pub const TRAITS_TOKEN: &str = "TraitsToken";
pub const SMOKE_DESCRIPTOR: &str = "SmokeDescriptor";
pub const MISSILE_DESCRIPTOR: &str = "MissileDescriptor";
pub const NIL: &str = "nil";
pub const DISPERSION_WITHOUT_SORTING: &str = "DispersionWithoutSorting";
pub const BASE_HIT_VALUE_MODIFIERS: &str = "BaseHitValueModifiers";
pub const HIT_MODIFIER_IDLING: &str = "Idling";
pub const HIT_MODIFIER_MOVING: &str = "Moving";
pub const DISTANCE_TO_TARGET_FLAG: &str = "EDiceHitModifier/DistanceToTarget";
pub const DAMAGE_DROP_OFF: &str = "DamageTypeEvolutionOverRangeDescriptor";
pub const DAMAGE_TYPE: &str = "TDamageTypeRTTI";
pub const DAMAGE_WEAPON: &str = "Arme";
pub const PIERCING_WEAPON: &str = "PiercingWeapon";
pub const MIN_MAX_CATEGORY: &str = "MinMaxCategory";
pub const ARMOR_PIERCING_FAMILY: &str = "ap";
pub const AP_TAG: &str = "_AP_";
pub const HE_TAG: &str = "_HE_";
pub const GATLING_TAGS: &[&str] = &["_GatlingAir_", "Gatling"];

// Missiles
pub const MISSILE_DEFAULT_CONFIG: &str = "DefaultConfig";

// Units
pub const UNIT_TYPE_MODULE: &str = "TTypeUnitModuleDescriptor";
pub const NATIONALITY: &str = "Nationalite";
pub const MOTHER_COUNTRY: &str = "MotherCountry";
pub const FORMATION: &str = "TypeUnitFormation";
pub const PRODUCTION_RESOURCES: &str = "ProductionRessourcesNeeded";
pub const COMMAND_POINTS_RESOURCE: &str = "Resource_CommandPoints";
pub const INFO_PANEL_TOKEN: &str = "InfoPanelConfigurationToken";
pub const FACTORY: &str = "Factory";
pub const EXPLOSIVE_REACTIVE_ARMOR: &str = "ExplosiveReactiveArmor";
pub const EXPERIENCE_PACK: &str = "ExperienceLevelsPackDescriptor";
pub const SPECIAL_FORCES_PACK: &str = "~/ExperienceLevelsPackDescriptor_XP_pack_SF";
pub const UNIT_MOVING_TYPE: &str = "UnitMovingType";
pub const DIVE_BOMB_STRATEGY: &str = "DiveBombAttackStrategyDescriptor";
pub const BOMB_STRATEGY: &str = "BombAttackStrategyDescriptor";
pub const SELL_MODULE: &str = "TSellModuleDescriptor";
pub const LAND_MOVEMENT: &str = "LandMovement";
pub const AIRPLANE_MOVEMENT: &str = "AirplaneMovement";
pub const HELICOPTER_MOVEMENT: &str = "HelicopterMovement";
pub const TERRAIN_LIST: &str = "TerrainList";
pub const UNOCCUPIABLE_TERRAINS: &[&str] = &["Tranchee", "NidMitrailleuse", "ForetDense"];
pub const SPECIALTIES_LIST: &str = "SpecialtiesList";
pub const SUPPORT_SPECIALTY: &str = "appui";
pub const LEADER_SPECIALTY: &str = "_leader";
pub const WEAPON_MANAGER: &str = "WeaponManager";
pub const OPTICAL_STRENGTHS: &str = "OpticalStrengths";
pub const VISION_RANGES: &str = "VisionRangesGRU";
pub const UNIT_DESCRIPTOR_PREFIX: &str = "Descriptor_Unit_";

// Armor, legacy and current
pub const ARMOR_FRONT: &str = "ArmorDescriptorFront";
pub const ARMOR_SIDES: &str = "ArmorDescriptorSides";
pub const ARMOR_REAR: &str = "ArmorDescriptorRear";
pub const ARMOR_TOP: &str = "ArmorDescriptorTop";
pub const RESISTANCE_FRONT: &str = "ResistanceFront";
pub const RESISTANCE_SIDES: &str = "ResistanceSides";
pub const RESISTANCE_REAR: &str = "ResistanceRear";
pub const RESISTANCE_TOP: &str = "ResistanceTop";
pub const LIGHT_ARMOR_STRENGTH: &str = "leger";

// RTTI family definitions
pub const FAMILY: &str = "Family";
pub const INDEX: &str = "Index";
pub const MAX_INDEX: &str = "MaxIndex";
pub const DAMAGE_FAMILY_PREFIX: &str = "DamageFamily_";
pub const RESISTANCE_FAMILY_PREFIX: &str = "ResistanceFamily_";

// Terrain
pub const SPEED_MODIFIER_WHEEL: &str = "SpeedModifierAllTerrainWheel";
pub const SPEED_MODIFIER_INFANTRY: &str = "SpeedModifierInfantry";
pub const SPEED_MODIFIER_TRACK: &str = "SpeedModifierTrack";
pub const DAMAGE_MODIFIER_PER_FAMILY: &str = "DamageModifierPerFamilyAndResistance";

// Divisions, packs and rules
pub const DIVISION_NATIONALITY: &str = "DivisionNationalite";
pub const COUNTRY_ID: &str = "CountryId";
pub const DIVISION_TAGS: &str = "DivisionTags";
pub const MAX_ACTIVATION_POINTS: &str = "MaxActivationPoints";
pub const COST_MATRIX: &str = "CostMatrix";
pub const PACK_LIST: &str = "PackList";
pub const MULTIPLAYER_TAG: &str = "DEFAULT";
pub const UNIT_RULE_LIST: &str = "UnitRuleList";
pub const UNIT_DESCRIPTOR: &str = "UnitDescriptor";
pub const AVAILABLE_TRANSPORT_LIST: &str = "AvailableTransportList";
pub const AVAILABLE_WITHOUT_TRANSPORT: &str = "AvailableWithoutTransport";
pub const UNITS_IN_PACK: &str = "NumberOfUnitInPack";
pub const UNITS_IN_PACK_XP_MULTIPLIER: &str = "NumberOfUnitInPackXPMultiplier";
pub const MAX_PACK_NUMBER: &str = "MaxPackNumber";
pub const UNIT_PATH_PREFIX: &str = "$/GFX/Unit/";
pub const LEGACY_PATH_ROOT: &str = "$/GFX";
pub const LOCAL_PATH_PREFIX: &str = "~/";

// Constants files
pub const BONUS_PRECISION: &str = "bonusPrecision";
pub const DAMAGE_TABLE_VALUES: &str = "Values";
pub const DEFAULT_SUPPRESS_DAMAGE: &str = "DefaultSuppressDamage";
pub const SUPPRESS_DAMAGE_PER_FAMILY: &str = "SuppressDamagePerFamily";
pub const BLINDAGES_TO_IGNORE: &str = "BlindagesToIgnoreForDamageFamilies";

/// How the raw number behind a key is scaled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitKind {
    /// Taken as is.
    Plain,
    /// Engine distance, scaled by the metre constant.
    Length,
    /// Seconds. The unit operand is dropped without scaling.
    Time,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldKey {
    pub key: &'static str,
    pub unit: UnitKind,
}

pub const fn plain(key: &'static str) -> FieldKey {
    FieldKey {
        key,
        unit: UnitKind::Plain,
    }
}

pub const fn length(key: &'static str) -> FieldKey {
    FieldKey {
        key,
        unit: UnitKind::Length,
    }
}

pub const fn time(key: &'static str) -> FieldKey {
    FieldKey {
        key,
        unit: UnitKind::Time,
    }
}

/// One logical field: the current key first, then legacy keys in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldRule {
    pub field: &'static str,
    pub current: FieldKey,
    pub legacy: &'static [FieldKey],
}

impl FieldRule {
    pub fn candidates(&self) -> impl Iterator<Item = &FieldKey> {
        std::iter::once(&self.current).chain(self.legacy.iter())
    }
}

macro_rules! field_rules {
    ($($name:ident => $field:literal : $current:expr $(, $legacy:expr)* ;)*) => {
        $(
            pub const $name: FieldRule = FieldRule {
                field: $field,
                current: $current,
                legacy: &[$($legacy),*],
            };
        )*

        /// Every rule, for exhaustive fallback checks.
        pub const ALL_RULES: &[FieldRule] = &[$($name),*];
    };
}

field_rules! {
    GROUND_MAX_RANGE => "groundMaxRange": length("PorteeMaximaleGRU"), length("PorteeMaximale");
    GROUND_MIN_RANGE => "groundMinRange": length("PorteeMinimaleGRU"), length("PorteeMinimale");
    HELI_MAX_RANGE => "heliMaxRange": length("PorteeMaximaleTBAGRU"), length("PorteeMaximaleTBA");
    HELI_MIN_RANGE => "heliMinRange": length("PorteeMinimaleTBAGRU"), length("PorteeMinimaleTBA");
    PLANE_MAX_RANGE => "planeMaxRange": length("PorteeMaximaleHAGRU"), length("PorteeMaximaleHA");
    PLANE_MIN_RANGE => "planeMinRange": length("PorteeMinimaleHAGRU"), length("PorteeMinimaleHA");
    HE_DAMAGE => "heDamage": plain("PhysicalDamages");
    HE_RADIUS => "heDamageRadius": length("RadiusSplashPhysicalDamagesGRU"), length("RadiusSplashPhysicalDamages");
    SUPPRESS_DAMAGE => "suppress": plain("SuppressDamages");
    SUPPRESS_RADIUS => "suppressDamagesRadius": length("RadiusSplashSuppressDamagesGRU"), length("RadiusSplashSuppressDamages");
    AIMING_TIME => "aimingTime": time("AimingTime"), time("TempsDeVisee");
    RELOAD_TIME => "reloadTime": time("TimeBetweenTwoSalvos"), time("TempsEntreDeuxSalves");
    SALVO_LENGTH => "salvoLength": plain("ShotsCountPerSalvo"), plain("NbTirParSalves");
    TIME_BETWEEN_SHOTS => "timeBetweenSalvos": time("TimeBetweenTwoShots"), time("TempsEntreDeuxTirs");
    AMMO_PER_SALVO => "ammunitionPerSalvo": plain("DisplayedAmmunitionPerSalvo"), plain("AffichageMunitionParSalve");
    SUPPLY_COST => "supplyCostPerSalvo": plain("SupplyCost");
    NOISE_MALUS => "noiseMalus": plain("NoiseDissimulationMalus");
    SHOTS_BEFORE_MAX_NOISE => "shotsBeforeMaxNoise": plain("ShotsBeforeMaxNoise");
    DISPERSION_AT_MAX_RANGE => "dispersionAtMaxRange": length("DispersionAtMaxRangeGRU"), length("DispersionAtMaxRange");
    DISPERSION_AT_MIN_RANGE => "dispersionAtMinRange": length("DispersionAtMinRangeGRU"), length("DispersionAtMinRange");
    MAX_SUCCESSIVE_HITS => "maxSuccessiveHitCount": plain("MaxSuccessiveHitCount");
    SMOKE_ALTITUDE => "altitude": length("AltitudeGRU"), length("Altitude");
    SMOKE_LIFETIME => "lifeSpan": time("TimeToLive");
    SMOKE_RADIUS => "radius": length("RadiusGRU"), length("Radius");
    MISSILE_MAX_SPEED => "maxMissileSpeed": length("MaxSpeedGRU"), length("MaxSpeed");
    MISSILE_MAX_ACCELERATION => "maxMissileAcceleration": length("MaxAccelerationGRU"), length("MaxAcceleration");
    TURRET_ROTATION => "turretRotationSpeed": plain("YawSpeed"), plain("VitesseRotation");
    UNIT_SPEED => "speed": plain("SpeedInKmph"), length("Speed");
    ROAD_SPEED => "roadSpeed": plain("DisplayRoadSpeedInKmph"), plain("RealRoadSpeed");
    ROTATION_TIME => "rotationTime": time("TimeHalfTurn"), time("TempsDemiTour");
    MAX_DAMAGE => "maxDamage": plain("MaxPhysicalDamages"), plain("MaxDamages");
    DEPLOYMENT_SHIFT => "advancedDeployment": length("DeploymentShiftGRU"), length("DeploymentShift");
    AGILITY_RADIUS => "agility": length("AgilityRadiusGRU"), length("AgilityRadius");
    FLYING_ALTITUDE => "flyingAltitude": length("LowAltitudeFlyingAltitudeGRU"), length("LowAltitudeFlyingAltitude");
    FUEL_CAPACITY => "fuel": plain("FuelCapacity");
    FUEL_MOVE_DURATION => "fuelMove": plain("FuelMoveDuration");
    SUPPLY_CAPACITY => "supply": plain("SupplyCapacity");
    ECM => "ecm": plain("HitRollECM");
    TRAVEL_DURATION => "travelTime": time("TravelDuration");
    STEALTH => "stealth": plain("UnitConcealmentBonus");
    DANGEROUSNESS => "dangerousness": plain("Dangerousness");
}

/// Current-schema range keys. Their presence marks an ammunition descriptor
/// as belonging to the current schema.
pub const CURRENT_RANGE_KEYS: &[&str] = &[
    GROUND_MAX_RANGE.current.key,
    HELI_MAX_RANGE.current.key,
    PLANE_MAX_RANGE.current.key,
];

/// Legacy optical strength keys per altitude band, which differ for planes.
pub fn legacy_optics_key(band: AltitudeBand, is_plane: bool) -> &'static str {
    match (band, is_plane) {
        (AltitudeBand::Standard, _) => "OpticalStrength",
        (AltitudeBand::LowAltitude, true) => "OpticalStrengthLowAltitude",
        (AltitudeBand::LowAltitude, false) => "OpticalStrengthAltitude",
        (AltitudeBand::HighAltitude, _) => "OpticalStrengthAltitude",
    }
}

/// Legacy vision range keys per altitude band. Values are metre strings.
pub fn legacy_vision_key(band: AltitudeBand, is_plane: bool) -> &'static str {
    match (band, is_plane) {
        (AltitudeBand::Standard, true) => "PorteeVisionFOW",
        (AltitudeBand::Standard, false) => "PorteeVision",
        (AltitudeBand::LowAltitude, _) => "PorteeVisionTBA",
        (AltitudeBand::HighAltitude, _) => "PorteeVisionHA",
    }
}

/// Sensor altitude bands, `EVisionUnitType/<band>` in current descriptors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AltitudeBand {
    Standard,
    LowAltitude,
    HighAltitude,
}

impl Token for AltitudeBand {
    const ALL: &'static [Self] = &[Self::Standard, Self::LowAltitude, Self::HighAltitude];

    fn token(&self) -> &'static str {
        match self {
            Self::Standard => "Standard",
            Self::LowAltitude => "LowAltitude",
            Self::HighAltitude => "HighAltitude",
        }
    }
}

/// Armor families named by armor and resistance tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArmorFamily {
    Blindage,
    Infanterie,
    Vehicule,
    Helico,
    Avion,
}

impl ArmorFamily {
    /// Families whose displayed armor is one below their strength.
    pub fn is_vehicle(&self) -> bool {
        matches!(self, Self::Vehicule | Self::Helico | Self::Avion)
    }
}

impl Token for ArmorFamily {
    const ALL: &'static [Self] = &[
        Self::Blindage,
        Self::Infanterie,
        Self::Vehicule,
        Self::Helico,
        Self::Avion,
    ];

    fn token(&self) -> &'static str {
        match self {
            Self::Blindage => "blindage",
            Self::Infanterie => "infanterie",
            Self::Vehicule => "vehicule",
            Self::Helico => "helico",
            Self::Avion => "avion",
        }
    }
}

/// Unit card layouts, from `InfoPanelConfigurationToken`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum InfoPanelType {
    Default,
    SupplyVehicle,
    TransportVehicle,
    Infantry,
    Plane,
    Helicopter,
    TransportHelicopter,
    SupplyHelicopter,
}

impl Token for InfoPanelType {
    const ALL: &'static [Self] = &[
        Self::Default,
        Self::SupplyVehicle,
        Self::TransportVehicle,
        Self::Infantry,
        Self::Plane,
        Self::Helicopter,
        Self::TransportHelicopter,
        Self::SupplyHelicopter,
    ];

    fn token(&self) -> &'static str {
        match self {
            Self::Default => "Default",
            Self::SupplyVehicle => "VehiculeSupplier",
            Self::TransportVehicle => "VehiculeTransporter",
            Self::Infantry => "Infantry",
            Self::Plane => "avion",
            Self::Helicopter => "HelicoDefault",
            Self::TransportHelicopter => "HelicoTransporter",
            Self::SupplyHelicopter => "HelicoSupplier",
        }
    }
}
