//! Request payloads for the `mgate` JSON endpoint.

use serde::Serialize;

use super::profile::{ClientInfo, HafasProfile};

/// Product bitmask accepting every transport mode.
pub const ALL_PRODUCTS: u32 = 1023;

/// Default board lookahead in minutes.
pub const DEFAULT_DURATION_MINUTES: u32 = 10;

#[derive(Debug, Serialize)]
struct Auth<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    aid: &'a str,
}

/// Outer request shared by every method call.
#[derive(Debug, Serialize)]
pub struct Envelope<'a, R> {
    id: &'a str,
    ver: &'a str,
    lang: &'a str,
    auth: Auth<'a>,
    client: &'a ClientInfo,
    formatted: bool,
    #[serde(rename = "svcReqL")]
    svc_req_l: [ServiceRequest<R>; 1],
}

#[derive(Debug, Serialize)]
struct ServiceRequest<R> {
    req: R,
    meth: &'static str,
    id: &'static str,
}

impl<'a, R: Serialize> Envelope<'a, R> {
    fn new(profile: &'a HafasProfile, meth: &'static str, id: &'static str, req: R) -> Self {
        Self {
            id: &profile.id,
            ver: &profile.ver,
            lang: &profile.lang,
            auth: Auth {
                kind: "AID",
                aid: &profile.aid,
            },
            client: &profile.client,
            formatted: false,
            svc_req_l: [ServiceRequest { req, meth, id }],
        }
    }
}

#[derive(Debug, Serialize)]
pub struct StationBoardReq<'a> {
    #[serde(rename = "stbLoc")]
    stb_loc: ExtLocation<'a>,
    #[serde(rename = "jnyFltrL")]
    jny_fltr_l: [JourneyFilter; 1],
    #[serde(rename = "type")]
    kind: &'static str,
    sort: &'static str,
    dur: u32,
}

#[derive(Debug, Serialize)]
struct ExtLocation<'a> {
    #[serde(rename = "extId")]
    ext_id: &'a str,
}

#[derive(Debug, Serialize)]
struct JourneyFilter {
    #[serde(rename = "type")]
    kind: &'static str,
    mode: &'static str,
    value: u32,
}

/// Departures from `ext_id` over the next `duration` minutes, all products,
/// sorted by departure time.
pub fn station_board<'a>(
    profile: &'a HafasProfile,
    ext_id: &'a str,
    duration: u32,
) -> Envelope<'a, StationBoardReq<'a>> {
    let req = StationBoardReq {
        stb_loc: ExtLocation { ext_id },
        jny_fltr_l: [JourneyFilter {
            kind: "PROD",
            mode: "INC",
            value: ALL_PRODUCTS,
        }],
        kind: "DEP",
        sort: "PT",
        dur: duration,
    };
    Envelope::new(profile, "StationBoard", "1|18|", req)
}

#[derive(Debug, Serialize)]
pub struct LocMatchReq {
    input: LocMatchInput,
}

#[derive(Debug, Serialize)]
struct LocMatchInput {
    field: &'static str,
    loc: LocMatchLoc,
    #[serde(rename = "maxLoc")]
    max_loc: u32,
}

#[derive(Debug, Serialize)]
struct LocMatchLoc {
    #[serde(rename = "type")]
    kind: &'static str,
    dist: u32,
    name: String,
}

/// Stop search by name prefix.
pub fn loc_match<'a>(
    profile: &'a HafasProfile,
    name: &str,
    dist: u32,
    max_loc: u32,
) -> Envelope<'a, LocMatchReq> {
    let req = LocMatchReq {
        input: LocMatchInput {
            field: "S",
            loc: LocMatchLoc {
                kind: "S",
                dist,
                name: format!("{name}?"),
            },
            max_loc,
        },
    };
    Envelope::new(profile, "LocMatch", "1|1|", req)
}
